//! Static event configuration: teams, competitions, bazaar categories and the points table.

use serde::Serialize;

/// The six participating teams, in the order the event lists them
pub const DEFAULT_ROSTER: [&str; 6] = [
    "Boulevard (Soedirman)",
    "Lotus Bougenville Senja (A. Yani)",
    "Cendana (Pattimura)",
    "Bintel Perdana (Diponegoro)",
    "Mangga Jambu Bhinneka (Cut Nyak Dhien)",
    "Jati Kenari (Bung Tomo)",
];

pub const BUSINESS_TYPES: [&str; 7] = [
    "Makanan & Minuman",
    "Pakaian & Aksesoris",
    "Kerajinan Tangan",
    "Produk Kecantikan",
    "Mainan Anak",
    "Elektronik",
    "Lainnya",
];

/// Registration category with the competitions open to it
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub key: &'static str,
    pub label: &'static str,
    /// Value stored in the Participants sheet's category column
    pub group: &'static str,
    pub competitions: &'static [&'static str],
}

pub static CATEGORIES: [Category; 3] = [
    Category {
        key: "anak",
        label: "Lomba Anak-anak",
        group: "Anak-anak",
        competitions: &[
            "Memasukan Bola",
            "Memindahkan Bendera",
            "Memindahkan Bola Dengan Centong",
            "Memasukan Pensil Kedalam Botol",
            "Estafet Kardus",
            "Memindahkan Gelas Menggunakan Balon",
            "Makan Kerupuk",
            "Jepit Balon",
            "Joget Bola Dalam Kardus",
        ],
    },
    Category {
        key: "ibu",
        label: "Lomba Ibu-ibu",
        group: "Ibu-ibu",
        competitions: &[
            "Menghias Tumpeng",
            "Volly Balon Raksasa",
            "Suit Jepang",
            "Estafet Air",
            "Pukul Paku",
        ],
    },
    Category {
        key: "bapak",
        label: "Lomba Bapak-bapak",
        group: "Bapak-bapak",
        competitions: &[
            "Tenis Meja",
            "Balap Karung Raksasa",
            "Volly Sarung",
            "Gaple",
            "Tarik Tambang",
            "Lomba Mancing (Opsional)",
        ],
    },
];

/// Canonical points for a finishing position: 1st 5, 2nd 3, 3rd 1, otherwise 0
///
/// Only the result-entry form uses this; stored results keep whatever points they were given.
pub fn points_for_position(position: i64) -> i64 {
    match position {
        1 => 5,
        2 => 3,
        3 => 1,
        _ => 0,
    }
}

/// A selectable podium position on the result-entry form
#[derive(Debug, Clone, Serialize)]
pub struct PositionOption {
    pub value: i64,
    pub label: String,
    pub points: i64,
}

pub fn positions() -> Vec<PositionOption> {
    (1..=3)
        .map(|value| PositionOption {
            value,
            label: format!("Juara {}", value),
            points: points_for_position(value),
        })
        .collect()
}

pub fn default_roster() -> Vec<String> {
    DEFAULT_ROSTER.iter().map(|team| team.to_string()).collect()
}

pub fn category(key: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// Map a form category key (`anak`) to the stored group name (`Anak-anak`); other values pass through
pub fn category_group(value: &str) -> &str {
    category(value).map_or(value, |c| c.group)
}
