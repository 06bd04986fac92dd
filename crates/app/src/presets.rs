//! Preset topics and levels offered by `lingo presets`.

use std::io::Write;

pub const TOPICS: &[&str] = &[
    "Kinh doanh & Khởi nghiệp",
    "Du lịch & Khám phá",
    "Ẩm thực & Văn hóa",
    "Công nghệ AI & IT",
    "Sức khỏe & Y khoa",
    "Giáo dục & Đào tạo",
    "Môi trường & Trái đất",
    "Đời sống & Xã hội",
    "Chính trị & Ngoại giao",
    "Nghệ thuật & Điện ảnh",
    "Khoa học & Vũ trụ",
    "Thể thao & Fitness",
    "Luật pháp & Pháp lý",
    "Tài chính & Đầu tư",
    "Tâm lý học",
];

pub const LEVELS: &[&str] = &[
    "A1 (Căn bản)",
    "A2 (Sơ cấp)",
    "B1 (Trung cấp)",
    "B2 (Trung cao)",
    "C1 (Cao cấp)",
    "C2 (Thành thạo)",
    "IELTS Band 6.0+",
    "IELTS Band 7.0+",
    "IELTS Band 8.0+",
    "TOEIC 500-700",
    "TOEIC 700-900",
];

pub const WORD_COUNTS: &[usize] = &[5, 10, 15, 20];

pub const DEFAULT_LEVEL: &str = "A2 (Sơ cấp)";

/// A 1-based preset number picks from `presets`; anything else is free text.
#[must_use]
pub fn resolve(raw: &str, presets: &[&str]) -> String {
    let raw = raw.trim();
    raw.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| presets.get(i))
        .map_or_else(|| raw.to_string(), |preset| (*preset).to_string())
}

pub fn render<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Topics:")?;
    for (i, topic) in TOPICS.iter().enumerate() {
        writeln!(out, "  {:>2}. {topic}", i + 1)?;
    }
    writeln!(out, "Levels:")?;
    for (i, level) in LEVELS.iter().enumerate() {
        writeln!(out, "  {:>2}. {level}", i + 1)?;
    }
    let counts: Vec<String> = WORD_COUNTS.iter().map(ToString::to_string).collect();
    writeln!(out, "Word counts: {} (any value from 3 to 50 works)", counts.join(", "))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_pick_presets_and_text_passes_through() {
        assert_eq!(resolve("2", TOPICS), "Du lịch & Khám phá");
        assert_eq!(resolve(" 1 ", LEVELS), "A1 (Căn bản)");
        assert_eq!(resolve("0", LEVELS), "0");
        assert_eq!(resolve("99", TOPICS), "99");
        assert_eq!(resolve("Space travel", TOPICS), "Space travel");
    }

    #[test]
    fn default_level_is_a_preset() {
        assert!(LEVELS.contains(&DEFAULT_LEVEL));
    }

    #[test]
    fn listing_numbers_every_preset() {
        let mut out = Vec::new();
        render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(" 1. Kinh doanh & Khởi nghiệp"));
        assert!(text.contains("11. TOEIC 700-900"));
        assert!(text.contains("Word counts: 5, 10, 15, 20"));
    }
}
