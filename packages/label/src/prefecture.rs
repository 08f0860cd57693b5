//! Prefecture names.

/// The 47 prefectures, in JIS code order.
pub const PREFECTURES: &[&str] = &[
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県", "茨城県", "栃木県",
    "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県", "新潟県", "富山県", "石川県", "福井県",
    "山梨県", "長野県", "岐阜県", "静岡県", "愛知県", "三重県", "滋賀県", "京都府", "大阪府",
    "兵庫県", "奈良県", "和歌山県", "鳥取県", "島根県", "岡山県", "広島県", "山口県", "徳島県",
    "香川県", "愛媛県", "高知県", "福岡県", "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県",
    "鹿児島県", "沖縄県",
];

/// Strips a leading prefecture name from a label.
///
/// The label is returned unchanged when it does not start with a
/// prefecture or when nothing would remain (a bare prefecture label such
/// as `東京都` stays as-is).
#[must_use]
pub fn strip_prefecture(label: &str) -> &str {
    let trimmed = label.trim_start();
    for prefecture in PREFECTURES {
        if let Some(rest) = trimmed.strip_prefix(prefecture) {
            let rest = rest.trim_start();
            if !rest.is_empty() {
                return rest;
            }
        }
    }
    label
}
