// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Equal-tempered pitch table.
//!
//! Frequencies are tabulated to two decimals for C1 through C8. The table is
//! authoritative: lookups never compute frequencies at runtime, so every
//! caller sees exactly the same value for a given name.

/// Pitch names and their frequencies in Hz, ascending by semitone.
pub const FREQUENCY_TABLE: [(&str, f64); 85] = [
    ("C1", 32.70), ("C#1", 34.65), ("D1", 36.71), ("D#1", 38.89), ("E1", 41.20), ("F1", 43.65), ("F#1", 46.25), ("G1", 49.00), ("G#1", 51.91), ("A1", 55.00), ("A#1", 58.27), ("B1", 61.74),
    ("C2", 65.41), ("C#2", 69.30), ("D2", 73.42), ("D#2", 77.78), ("E2", 82.41), ("F2", 87.31), ("F#2", 92.50), ("G2", 98.00), ("G#2", 103.83), ("A2", 110.00), ("A#2", 116.54), ("B2", 123.47),
    ("C3", 130.81), ("C#3", 138.59), ("D3", 146.83), ("D#3", 155.56), ("E3", 164.81), ("F3", 174.61), ("F#3", 185.00), ("G3", 196.00), ("G#3", 207.65), ("A3", 220.00), ("A#3", 233.08), ("B3", 246.94),
    ("C4", 261.63), ("C#4", 277.18), ("D4", 293.66), ("D#4", 311.13), ("E4", 329.63), ("F4", 349.23), ("F#4", 369.99), ("G4", 392.00), ("G#4", 415.30), ("A4", 440.00), ("A#4", 466.16), ("B4", 493.88),
    ("C5", 523.25), ("C#5", 554.37), ("D5", 587.33), ("D#5", 622.25), ("E5", 659.25), ("F5", 698.46), ("F#5", 739.99), ("G5", 783.99), ("G#5", 830.61), ("A5", 880.00), ("A#5", 932.33), ("B5", 987.77),
    ("C6", 1046.50), ("C#6", 1108.73), ("D6", 1174.66), ("D#6", 1244.51), ("E6", 1318.51), ("F6", 1396.91), ("F#6", 1479.98), ("G6", 1567.98), ("G#6", 1661.22), ("A6", 1760.00), ("A#6", 1864.66), ("B6", 1975.53),
    ("C7", 2093.00), ("C#7", 2217.46), ("D7", 2349.32), ("D#7", 2489.02), ("E7", 2637.02), ("F7", 2793.83), ("F#7", 2959.96), ("G7", 3135.96), ("G#7", 3322.44), ("A7", 3520.00), ("A#7", 3729.31), ("B7", 3951.07),
    ("C8", 4186.01),];

/// Sharp-spelled pitch classes in chromatic order
const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Natural pitch classes, highest first, as laid out in the piano roll
const ROLL_NATURALS: [&str; 7] = ["B", "A", "G", "F", "E", "D", "C"];

/// Number of rows in the piano roll (C8 down to C1, naturals only)
pub const ROLL_ROWS: usize = 50;

/// Look up the frequency for a pitch name such as `"C4"` or `"F#5"`.
///
/// Returns `None` for names that are not in the table.
pub fn frequency(name: &str) -> Option<f64> {
    FREQUENCY_TABLE
        .iter()
        .find(|(pitch, _)| *pitch == name)
        .map(|(_, freq)| *freq)
}

/// Check whether a name is one of the tabulated pitches
pub fn is_valid_pitch(name: &str) -> bool {
    frequency(name).is_some()
}

/// Semitone number of a pitch, counting from C0 = 0 (so A4 = 57).
pub fn semitone_index(name: &str) -> Option<u8> {
    let split = name.find(|c: char| c.is_ascii_digit())?;
    let (class, octave) = name.split_at(split);
    let octave: u8 = octave.parse().ok()?;
    let class = PITCH_CLASSES.iter().position(|pc| *pc == class)? as u8;
    octave.checked_mul(12)?.checked_add(class)
}

/// Frequency computed from A4 = 440 Hz. Only used to cross-check the table.
pub fn equal_tempered(semitone: u8) -> f64 {
    440.0 * 2f64.powf((semitone as f64 - 57.0) / 12.0)
}

/// Map a computer-keyboard key to a pitch (two rows of keys, C4 to F5)
pub fn key_to_pitch(key: char) -> Option<&'static str> {
    let pitch = match key.to_ascii_lowercase() {
        'a' => "C4",
        'w' => "C#4",
        's' => "D4",
        'e' => "D#4",
        'd' => "E4",
        'f' => "F4",
        't' => "F#4",
        'g' => "G4",
        'y' => "G#4",
        'h' => "A4",
        'u' => "A#4",
        'j' => "B4",
        'k' => "C5",
        'o' => "C#5",
        'l' => "D5",
        'p' => "D#5",
        ';' => "E5",
        '\'' => "F5",
        _ => return None,
    };
    Some(pitch)
}

/// Pitch shown on a piano-roll row. Row 0 is C8; each octave below
/// contributes seven natural rows, ending with C1 on the last row.
pub fn pitch_for_row(row: usize) -> Option<String> {
    if row >= ROLL_ROWS {
        return None;
    }
    if row == 0 {
        return Some("C8".to_string());
    }
    let offset = row - 1;
    let octave = 7 - offset / 7;
    Some(format!("{}{}", ROLL_NATURALS[offset % 7], octave))
}

/// Inverse of [`pitch_for_row`]. Sharps have no row of their own.
pub fn row_for_pitch(name: &str) -> Option<usize> {
    (0..ROLL_ROWS).find(|&row| pitch_for_row(row).as_deref() == Some(name))
}
