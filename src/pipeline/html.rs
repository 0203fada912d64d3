use crate::{
    error::{GenError, Result},
    models::{ContentType, ModelClass, WebsiteBrief},
    providers::ModelAccess,
};

fn html_context(content_type: ContentType, brief: &WebsiteBrief, original_prompt: &str) -> String {
    let kind_instructions = match content_type {
        ContentType::Game => {
            "Build a playable browser game. Render it on a <canvas> with inline JavaScript, \
             include keyboard controls, a score display, and a restart action."
        }
        ContentType::Website => {
            "Build a responsive, modern landing page with a header, navigation, \
             clearly separated content sections and a footer."
        }
    };

    format!(
        "<task>Generate the complete home page for the following {kind} request.</task>

<request>{prompt}</request>

<brief>
{brief}
</brief>

<instructions>
{kind_instructions}
- Return ONE complete HTML document starting with <!DOCTYPE html>
- Inline all CSS and JavaScript; load frontend libraries only from public CDNs
- Do not reference local files or pages other than this one
- Respond with the HTML only, no commentary
</instructions>",
        kind = content_type,
        prompt = original_prompt,
        brief = brief.to_prompt(),
        kind_instructions = kind_instructions,
    )
}

/// Returns the body of the first fenced code block, or the whole reply when
/// there is none.
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_open = &trimmed[open + 3..];
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(after_open.len());
    let body = &after_open[body_start..];
    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

pub async fn generate_html(
    content_type: ContentType,
    brief: &WebsiteBrief,
    original_prompt: &str,
    model: &dyn ModelAccess,
) -> Result<String> {
    let context = html_context(content_type, brief, original_prompt);
    log::info!("Generating {} HTML content", content_type);

    let reply = model.generate(&context, ModelClass::Large).await?;
    let html = strip_code_fences(&reply);
    if html.is_empty() {
        return Err(GenError::ResponseError("Model returned no HTML content".into()));
    }
    log::debug!("Generated {} bytes of HTML", html.len());
    Ok(html.to_string())
}
