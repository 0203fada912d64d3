use crate::{error::Result, models::Caption, providers::ImageDescriber};

/// Describer errors are returned as-is.
pub async fn generate_caption(image_url: &str, describer: &dyn ImageDescriber) -> Result<Caption> {
    let described = describer.describe_image(image_url).await?;
    Ok(Caption {
        title: described.title.trim().to_string(),
        description: described.description.trim().to_string(),
    })
}
