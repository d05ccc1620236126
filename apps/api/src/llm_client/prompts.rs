// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it;
// this file holds cross-cutting fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Common instruction appended to extraction prompts. The pipeline's
/// contract is that nothing is fabricated beyond the source document.
pub const VERBATIM_INSTRUCTION: &str = "\
    CRITICAL: Every value you emit must appear verbatim in the document \
    (images or text layers). Do NOT infer, interpolate, or invent details. \
    If the document does not contain a field, omit it entirely.";
