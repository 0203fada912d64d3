use crate::{
    error::{GenError, Result},
    models::{CharacterProfile, ModelClass, WebsiteBrief},
    providers::ModelAccess,
};

const IMAGE_PROMPT_TEMPLATE: &str = "# Task: Enhance the image generation prompt
Your task is to enhance the user's request into a detailed prompt that will generate the best possible image.

# Instructions
- Focus on artistic style, mood, lighting, composition and important details
- Keep the final prompt under 200 characters
- If the request is to \"generate anything\", you have creative control
- Only respond with the enhanced prompt text, no other commentary

Original request: {{prompt}}

Enhanced prompt:";

pub fn image_prompt_context(original_prompt: &str) -> String {
    IMAGE_PROMPT_TEMPLATE.replace("{{prompt}}", original_prompt)
}

/// Rewrites an image request into a richer prompt.
///
/// Enhancement is optional: with no model, a model error, or a blank
/// reply, the original prompt comes back untouched.
pub async fn enhance(original_prompt: &str, model: Option<&dyn ModelAccess>) -> String {
    let Some(model) = model else {
        log::info!("No text model available, using original prompt");
        return original_prompt.to_string();
    };

    let context = image_prompt_context(original_prompt);
    log::debug!("Sending enhancement context: {}", context);

    match model.generate(&context, ModelClass::Large).await {
        Ok(reply) if !reply.trim().is_empty() => {
            let enhanced = reply.trim().to_string();
            log::info!("Successfully enhanced prompt to: {}", enhanced);
            enhanced
        }
        Ok(_) => {
            log::warn!("Prompt enhancement returned nothing, using original prompt");
            original_prompt.to_string()
        }
        Err(e) => {
            log::warn!("Prompt enhancement failed, using original prompt: {}", e);
            original_prompt.to_string()
        }
    }
}

fn website_prompt_context(original_prompt: &str, character: &CharacterProfile) -> String {
    format!(
        "<character>
{bio}
{lore}
{style}
</character>

<task>As {name}, generate an enhanced prompt for a website based on the following user request:
{prompt}

Your task is to enhance the user's request into a detailed prompt that will generate the best possible website.</task>

<requirements>The enhanced prompt should include the following:
- A detailed description of the website's purpose and content
- A list of the website's pages and a brief description of each page's content
- A list of the website's features and functionality
- A url for the website
- A list of the website's frontend dependencies. DO NOT INCLUDE BACKEND DEPENDENCIES.
- A list of the website pages to be generated and a brief description of each page's content</requirements>

<format>Return the prompt in this format, DO NOT INCLUDE ANY OTHER TEXT:

{{
  \"description\": \"<description>\",
  \"pages\": \"<pages>\",
  \"features\": \"<features>\",
  \"url\": \"<url>\",
  \"dependencies\": \"<dependencies>\",
  \"pageDescriptions\": \"<pageDescriptions>\"
}}</format>
",
        bio = character.bio.join("\n"),
        lore = character.lore.join("\n"),
        style = character.style.join("\n"),
        name = character.name,
        prompt = original_prompt,
    )
}

/// Pulls the outermost JSON object out of a model reply that may be wrapped
/// in code fences or prose.
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

pub fn parse_website_brief(reply: &str) -> Result<WebsiteBrief> {
    let json = extract_json_object(reply)
        .ok_or_else(|| GenError::ParseError("no JSON object in website brief".into()))?;
    serde_json::from_str(json).map_err(|e| GenError::ParseError(format!("website brief: {}", e)))
}

/// Asks the model for a structured website brief. Model failures and
/// malformed briefs are errors; nothing unparsed is passed on.
pub async fn generate_website_brief(
    original_prompt: &str,
    character: &CharacterProfile,
    model: &dyn ModelAccess,
) -> Result<WebsiteBrief> {
    let context = website_prompt_context(original_prompt, character);
    log::info!("Generating enhanced website prompt...");
    let reply = model.generate(&context, ModelClass::Medium).await?;
    let brief = parse_website_brief(&reply)?;
    log::info!("Received website brief for {}", brief.url);
    Ok(brief)
}
