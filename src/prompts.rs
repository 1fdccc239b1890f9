//! Canned example prompts surfaced by front ends.

/// Short starter prompts for the editing workflow.
pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "Add a retro filter",
    "Make it look like a oil painting",
    "Remove the background",
    "Add a cute cat next to the person",
    "Turn this into a cyberpunk scene",
];

/// A longer, detailed example showing what a full edit instruction looks
/// like (background replacement with style and quality directions).
pub const DETAILED_EXAMPLE_PROMPT: &str =
    "将背景替换为充满科技感的赛博朋克城市街道，霓虹灯闪烁，雨夜氛围，保留前景主体，高画质。";
