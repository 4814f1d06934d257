use gemchat_models::ChatRequest;

/// Flatten a chat request into a single prompt.
///
/// Every message except the last becomes a `role: content` line; the last
/// one is the prompt itself and is appended as `User: {prompt}`.
pub fn build_prompt(request: &ChatRequest) -> String {
    let earlier = request
        .messages
        .split_last()
        .map(|(_, earlier)| earlier)
        .unwrap_or_default();

    let history = earlier
        .iter()
        .map(|msg| format!("{}: {}", msg.role.as_str(), msg.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\nUser: {}", history, request.prompt)
}
