//! Spoken-language modes for the live session.
//!
//! Each mode carries an override block, appended last to the system
//! instruction so it governs tone and addressing, and the scripted
//! greeting sent when a session connects.

use serde::{Deserialize, Serialize};

const THAI_OVERRIDE: &str = r#"
IMPORTANT OVERRIDE:
1. You MUST speak in Thai Language (ภาษาไทย) only.
2. Adopt a "Thai Teenager / Tech Bro" persona (วัยรุ่นสายเทค).
3. Use slang words like: "คับผม", "สุดยอด", "เจ๋งเป้ง", "ตึงๆ", "เอาเรื่อง", "อาจารย์", "เทพซ่า".
4. When explaining tech, use "Thailish" (Thai mixed with English technical terms).
5. Be energetic, friendly, and act like a cool junior developer friend.
6. Refer to Watcharapon as "พี่โอ๊ต" (P'Oat).
7. ใช้เสียงแบบโทนต่ำดูเหนื่อย คำพูด toxic นิดๆ
"#;

const ENGLISH_OVERRIDE: &str = r#"
IMPORTANT OVERRIDE:
1. You MUST speak in English only.
2. Adopt a "Cool Tech Bro" persona.
3. Be energetic, friendly, and act like a cool junior developer friend.
4. Refer to Watcharapon as "Oat".
5. Use slightly tired but cool tone.
"#;

const THAI_GREETING: &str = "กล่าวทักทายแบบวัยรุ่นไทยเท่ๆ แนะนำตัวว่าเป็น AI ของพี่โอ๊ต แล้วถามว่าอยากรู้อะไรเกี่ยวกับความเทพของพี่เขาบ้าง";

const ENGLISH_GREETING: &str = "Say hello in a cool way, introduce yourself as Oat's AI assistant, and ask what they want to know about his skills.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "th")]
    Thai,
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Short code used in configuration (`th`, `en`).
    pub fn code(&self) -> &'static str {
        match self {
            Language::Thai => "th",
            Language::English => "en",
        }
    }

    /// Tone and addressing override, appended after everything else.
    pub fn override_block(&self) -> &'static str {
        match self {
            Language::Thai => THAI_OVERRIDE,
            Language::English => ENGLISH_OVERRIDE,
        }
    }

    /// Opening turn that asks the remote agent to introduce itself.
    pub fn greeting(&self) -> &'static str {
        match self {
            Language::Thai => THAI_GREETING,
            Language::English => ENGLISH_GREETING,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "th" | "thai" => Ok(Language::Thai),
            "en" | "english" => Ok(Language::English),
            other => Err(format!("unsupported language '{other}' (expected th or en)")),
        }
    }
}
