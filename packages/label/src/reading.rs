//! Hiragana reading dictionary for municipality names.
//!
//! Lets users type a municipality in kana (`しんじゅく`, `セタガヤク`) and
//! still resolve it against area labels that are written in kanji. The
//! table is static data; extending it is a data change.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// `(reading, kanji)` pairs. Readings include the administrative suffix.
const READINGS: &[(&str, &str)] = &[
    // Tokyo special wards
    ("ちよだく", "千代田区"),
    ("ちゅうおうく", "中央区"),
    ("みなとく", "港区"),
    ("しんじゅくく", "新宿区"),
    ("ぶんきょうく", "文京区"),
    ("たいとうく", "台東区"),
    ("すみだく", "墨田区"),
    ("こうとうく", "江東区"),
    ("しながわく", "品川区"),
    ("めぐろく", "目黒区"),
    ("おおたく", "大田区"),
    ("せたがやく", "世田谷区"),
    ("しぶやく", "渋谷区"),
    ("なかのく", "中野区"),
    ("すぎなみく", "杉並区"),
    ("としまく", "豊島区"),
    ("きたく", "北区"),
    ("あらかわく", "荒川区"),
    ("いたばしく", "板橋区"),
    ("ねりまく", "練馬区"),
    ("あだちく", "足立区"),
    ("かつしかく", "葛飾区"),
    ("えどがわく", "江戸川区"),
    // Tokyo cities
    ("はちおうじし", "八王子市"),
    ("たちかわし", "立川市"),
    ("むさしのし", "武蔵野市"),
    ("みたかし", "三鷹市"),
    ("ふちゅうし", "府中市"),
    ("ちょうふし", "調布市"),
    ("まちだし", "町田市"),
    ("こがねいし", "小金井市"),
    ("こくぶんじし", "国分寺市"),
    ("にしとうきょうし", "西東京市"),
    // Designated cities
    ("さっぽろし", "札幌市"),
    ("せんだいし", "仙台市"),
    ("さいたまし", "さいたま市"),
    ("ちばし", "千葉市"),
    ("よこはまし", "横浜市"),
    ("かわさきし", "川崎市"),
    ("さがみはらし", "相模原市"),
    ("にいがたし", "新潟市"),
    ("しずおかし", "静岡市"),
    ("はままつし", "浜松市"),
    ("なごやし", "名古屋市"),
    ("きょうとし", "京都市"),
    ("おおさかし", "大阪市"),
    ("さかいし", "堺市"),
    ("こうべし", "神戸市"),
    ("おかやまし", "岡山市"),
    ("ひろしまし", "広島市"),
    ("きたきゅうしゅうし", "北九州市"),
    ("ふくおかし", "福岡市"),
    ("くまもとし", "熊本市"),
    // Hamamatsu wards after the 2024 reorganization
    ("はまなく", "浜名区"),
    ("てんりゅうく", "天竜区"),
    // Commuter belt and regional centers
    ("ふなばしし", "船橋市"),
    ("いちかわし", "市川市"),
    ("まつどし", "松戸市"),
    ("かしわし", "柏市"),
    ("かわぐちし", "川口市"),
    ("ところざわし", "所沢市"),
    ("ふじさわし", "藤沢市"),
    ("ちがさきし", "茅ヶ崎市"),
    ("かまくらし", "鎌倉市"),
    ("つくばし", "つくば市"),
    ("みとし", "水戸市"),
    ("うつのみやし", "宇都宮市"),
    ("まえばしし", "前橋市"),
    ("たかさきし", "高崎市"),
    ("ながのし", "長野市"),
    ("かなざわし", "金沢市"),
    ("とやまし", "富山市"),
    ("ぎふし", "岐阜市"),
    ("おおつし", "大津市"),
    ("ならし", "奈良市"),
    ("わかやまし", "和歌山市"),
    ("ひめじし", "姫路市"),
    ("にしのみやし", "西宮市"),
    ("あかしし", "明石市"),
    ("たかまつし", "高松市"),
    ("まつやまし", "松山市"),
    ("ながさきし", "長崎市"),
    ("かごしまし", "鹿児島市"),
    ("なはし", "那覇市"),
];

/// Readings of the administrative suffixes a user may leave off.
const SUFFIX_READINGS: &[&str] = &["く", "し", "ちょう", "まち", "むら", "そん"];

static BY_READING: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| READINGS.iter().copied().collect());

static BY_KANJI: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| READINGS.iter().map(|&(r, k)| (k, r)).collect());

/// Looks up the kanji municipality name for a hiragana reading.
///
/// The reading may omit the administrative suffix (`しんじゅく` finds
/// `新宿区`). An exact reading always wins over a suffix-completed one.
#[must_use]
pub fn lookup_reading(reading: &str) -> Option<&'static str> {
    if reading.is_empty() {
        return None;
    }
    if let Some(kanji) = BY_READING.get(reading) {
        return Some(kanji);
    }
    SUFFIX_READINGS.iter().find_map(|suffix| {
        let full = format!("{reading}{suffix}");
        BY_READING.get(full.as_str()).copied()
    })
}

/// Returns the hiragana reading of a kanji municipality name, if known.
#[must_use]
pub fn reading_of(kanji: &str) -> Option<&'static str> {
    BY_KANJI.get(kanji).copied()
}
