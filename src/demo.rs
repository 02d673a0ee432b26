//! Sample rows served when the store is unreachable and demo mode is switched on.

use crate::range::SheetRange;

const DEMO_TIMESTAMP: &str = "2025-08-17T08:00:00.000Z";

const PARTICIPANT_ROWS: [[&str; 8]; 8] = [
    ["Ahmad Rizki", "08123456789", "Boulevard (Soedirman)", "Tenis Meja", "Bapak-bapak", "", DEMO_TIMESTAMP, "confirmed"],
    ["Siti Nurhaliza", "08234567890", "Lotus Bougenville Senja (A. Yani)", "Menghias Tumpeng", "Ibu-ibu", "", DEMO_TIMESTAMP, "pending"],
    ["Budi Santoso", "08345678901", "Cendana (Pattimura)", "Balap Karung Raksasa", "Bapak-bapak", "", DEMO_TIMESTAMP, "confirmed"],
    ["Rina Kartika", "08456789012", "Bintel Perdana (Diponegoro)", "Volly Balon Raksasa", "Ibu-ibu", "", DEMO_TIMESTAMP, "confirmed"],
    ["Aisyah Putri", "08567890123", "Boulevard (Soedirman)", "Makan Kerupuk", "Anak-anak", "", DEMO_TIMESTAMP, "pending"],
    ["Kenzo Pratama", "08678901234", "Bintel Perdana (Diponegoro)", "Jepit Balon", "Anak-anak", "", DEMO_TIMESTAMP, "confirmed"],
    ["Maya Sari", "08789012345", "Jati Kenari (Bung Tomo)", "Suit Jepang", "Ibu-ibu", "", DEMO_TIMESTAMP, "pending"],
    ["Dedi Kurniawan", "08890123456", "Mangga Jambu Bhinneka (Cut Nyak Dhien)", "Gaple", "Bapak-bapak", "", DEMO_TIMESTAMP, "confirmed"],
];

const BAZAAR_ROWS: [[&str; 13]; 3] = [
    [
        "Maya Sari", "08123456789", "Jati Kenari (Bung Tomo)", "Warung Makan Bu Maya", "Makanan & Minuman",
        "Nasi gudeg, soto ayam, es teh", "true", "true", "true", "Butuh akses air", "", DEMO_TIMESTAMP, "confirmed",
    ],
    [
        "Dedi Kurniawan", "08234567890", "Boulevard (Soedirman)", "Toko Elektronik Dedi", "Elektronik",
        "Charger HP, kabel data, powerbank", "true", "false", "false", "", "", DEMO_TIMESTAMP, "pending",
    ],
    [
        "Sari Indah", "08345678901", "Cendana (Pattimura)", "Kerajinan Sari", "Kerajinan Tangan",
        "Tas rajut, dompet, aksesoris", "false", "true", "true", "Lokasi teduh", "", DEMO_TIMESTAMP, "confirmed",
    ],
];

const LEADERBOARD_ROWS: [[&str; 7]; 3] = [
    ["1", "Tenis Meja", "Boulevard (Soedirman)", "1", "5", "", DEMO_TIMESTAMP],
    ["2", "Tenis Meja", "Cendana (Pattimura)", "2", "3", "", DEMO_TIMESTAMP],
    ["3", "Menghias Tumpeng", "Bintel Perdana (Diponegoro)", "1", "5", "", DEMO_TIMESTAMP],
];

fn owned<const N: usize>(rows: &[[&str; N]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Demo rows for the tab a range points at, without its header row
///
/// Unknown tabs and unparsable ranges give no rows.
pub fn rows_for(range: &str) -> Vec<Vec<String>> {
    let sheet = match SheetRange::parse(range) {
        Some(parsed) => parsed.sheet,
        None => return Vec::new(),
    };
    match sheet.as_str() {
        "Participants" => owned(&PARTICIPANT_ROWS[..]),
        "Bazaar" => owned(&BAZAAR_ROWS[..]),
        "Leaderboard" => owned(&LEADERBOARD_ROWS[..]),
        _ => Vec::new(),
    }
}
