// All LLM prompt constants for the Generation module.

use crate::llm_client::prompts::JSON_ONLY_SUFFIX;
use crate::models::reference::Platform;

/// System prompt for pack generation. `JSON_ONLY_SUFFIX` is appended at call time.
pub const GENERATION_SYSTEM: &str = "You are a professional scriptwriter and content creator.";

pub const YOUTUBE_HINTS: &str = "Format for YouTube Shorts (≤60s). 1:1 or 9:16 framing. Hook in ≤3s.
Keep spoken lines short. Include on-screen text cues in [TEXT] brackets.";

pub const INSTAGRAM_HINTS: &str = "Format for Instagram Reels (≤60s). Emphasize visual transitions;
front-load novelty. Keep copy friendly and hashtag list compact (≤8).";

pub const TIKTOK_HINTS: &str = "Format for TikTok (≤60s). Pattern interrupt in first 2s.
Use rhythmic phrasing; avoid platform-ban phrases. Use 3-6 focused hashtags.";

pub fn platform_hints(platform: Platform) -> &'static str {
    match platform {
        Platform::Youtube => YOUTUBE_HINTS,
        Platform::Instagram => INSTAGRAM_HINTS,
        Platform::Tiktok => TIKTOK_HINTS,
    }
}

pub fn generation_system() -> String {
    format!("{GENERATION_SYSTEM} {JSON_ONLY_SUFFIX}")
}

/// Pack generation prompt template.
/// Replace: {platform_upper}, {platform}, {title}, {why_it_worked},
///          {problem}, {promise}, {proof}, {pitch}, {platform_hints}
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"CREATE {platform_upper} CONTENT PACK
Platform: {platform}
Reference: {title}
Why it worked: {why_it_worked}
Offer: Problem: {problem}, Promise: {promise}, Proof: {proof}, Pitch: {pitch}

GUIDELINES:
{platform_hints}

TASK: Generate comprehensive platform-native content pack based on successful patterns and offer integration.

Return JSON with:
- script: complete primary script with [TEXT: cues]
- script_variants: array of 3-5 alternative hook variants
- captions: 1-2 sentences ending with CTA
- hashtags: array of 4-8 niche-specific tags
- beats: array of {t, beat} for timeline
- beat_sheet: detailed beat sheet with types (hook, setup, proof, payoff, cta, transition)
- broll: array of {t, cue, shot_type?, keywords?} for visual elements
- thumbnail_brief: concrete visual guidance with composition details
- subtitles: valid SRT format
- vo_script: voice-over script (if applicable)

Constraints:
- Script: Hook → Setup → Proof → Payoff → CTA
- Keep it engaging and platform-optimized
- Include specific CTAs and value propositions
- Generate multiple hook variants for flexibility
- Include detailed beat sheet with timing and types
- Provide shot type and keyword information for b-roll
- Create thumbnail brief with concrete visual guidance
- Generate subtitles in proper SRT format
- All timestamps (t) are numbers of seconds"#;
