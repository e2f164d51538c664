// Dialogue-turn prompt fragments.

/// Appended to the latest user message sent to the model when the topic guard is on.
pub const TOPIC_GUARD_REMINDER: &str = "\n\n[Interviewer reminder: stay strictly on the interview. \
If the candidate asks about anything unrelated to this interview, politely refuse and steer back \
to the interview.]";

/// Tool results containing this prefix carry a coding-problem link for the client UI.
pub const CODING_LINK_PREFIX: &str = "https://leetcode.com/problems/";

/// Line format the final reply must use for a coding-problem link. Replace `{url}`.
pub const CODING_LINK_LINE: &str = "Problem link: {url}";

/// Transient system directive sent with the follow-up request after a link was found.
/// Replace: {url}, {link_line}
pub const CODING_LINK_DIRECTIVE: &str = "The coding problem tool returned a problem link: {url}\n\
Present this problem to the candidate now. Your reply MUST include the link verbatim on its own \
line, in exactly this format:\n{link_line}";
