// Prompt constants for niche suggestions.

/// Replace `{platform}` before sending.
pub const SUGGEST_SYSTEM_TEMPLATE: &str = "You suggest {platform} creators and hashtags for a given niche. \
    Return STRICT JSON with {\"creators\": string[], \"hashtags\": string[]}.";

/// Replace `{niche}` and `{platform}` before sending.
pub const SUGGEST_PROMPT_TEMPLATE: &str =
    "Niche: {niche}\n\nSuggest 5-10 relevant {platform} creators and 5-10 relevant hashtags.";
