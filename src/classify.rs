use crate::{
    models::{ContentType, ModelClass},
    providers::ModelAccess,
};

fn classification_context(prompt: &str) -> String {
    format!(
        "Analyze this prompt and determine if it's requesting a game or a website. Only respond with either \"GAME\" or \"WEBSITE\".

Prompt: {}",
        prompt
    )
}

/// Only an exact "game" (trimmed, any case) counts as a game.
pub fn parse_content_type(reply: &str) -> ContentType {
    if reply.trim().eq_ignore_ascii_case("game") {
        ContentType::Game
    } else {
        ContentType::Website
    }
}

/// Best-effort classification; model errors fall back to [`ContentType::Website`].
pub async fn classify(prompt: &str, model: &dyn ModelAccess) -> ContentType {
    match model
        .generate(&classification_context(prompt), ModelClass::Medium)
        .await
    {
        Ok(reply) => {
            let content_type = parse_content_type(&reply);
            log::info!("Requested content type: {}", content_type);
            content_type
        }
        Err(e) => {
            log::warn!("Content type detection failed, assuming website: {}", e);
            ContentType::Website
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_type() {
        assert_eq!(parse_content_type("GAME"), ContentType::Game);
        assert_eq!(parse_content_type("  game\n"), ContentType::Game);
        assert_eq!(parse_content_type("Game"), ContentType::Game);
        assert_eq!(parse_content_type("WEBSITE"), ContentType::Website);
        assert_eq!(parse_content_type("GAME."), ContentType::Website);
        assert_eq!(parse_content_type("It's a game"), ContentType::Website);
        assert_eq!(parse_content_type(""), ContentType::Website);
    }

    #[test]
    fn test_context_mentions_both_tokens() {
        let context = classification_context("a snake clone");
        assert!(context.contains("\"GAME\" or \"WEBSITE\""));
        assert!(context.ends_with("Prompt: a snake clone"));
    }
}
