//! Media Commands
//!
//! Media lives in an external library. The editor stores the media id as a
//! weak reference, plus the url and title it resolved to at insertion time;
//! it never re-resolves while rendering.

use crate::command::insert_block;
use crate::{Command, CommandContext, Result, Transaction};
use doc_model::{Attrs, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A library item as handed over by the media library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub url: String,
    /// MIME type, or a bare kind such as `image`
    pub media_type: String,
    pub original_name: String,
    pub alt_text: Option<String>,
    pub file_size: Option<u64>,
}

/// Looks up library items by id
pub trait MediaResolver {
    fn resolve_media(&self, media_id: &str) -> Option<ResolvedMedia>;
}

/// Node type used for a media type
pub fn media_node_type(media_type: &str) -> NodeType {
    let kind = media_type.split('/').next().unwrap_or_default();
    match kind {
        "image" => NodeType::Image,
        "audio" => NodeType::Audio,
        "video" => NodeType::Video,
        _ => NodeType::DocumentFile,
    }
}

/// Insert a library item as an image, audio, video or document block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertMedia {
    pub media_id: String,
    pub media: ResolvedMedia,
    /// Image alignment; `center` when absent
    pub alignment: Option<String>,
}

impl InsertMedia {
    pub fn new(media_id: impl Into<String>, media: ResolvedMedia) -> Self {
        Self {
            media_id: media_id.into(),
            media,
            alignment: None,
        }
    }

    /// Resolve through the library; `None` when the id is unknown
    pub fn resolve(resolver: &dyn MediaResolver, media_id: &str) -> Option<Self> {
        resolver
            .resolve_media(media_id)
            .map(|media| Self::new(media_id, media))
    }

    pub fn aligned(mut self, alignment: impl Into<String>) -> Self {
        self.alignment = Some(alignment.into());
        self
    }

    fn attrs(&self, node_type: NodeType) -> Attrs {
        let media = &self.media;
        let mut attrs = Attrs::new();
        attrs.insert("mediaId".into(), Value::from(self.media_id.clone()));
        attrs.insert("src".into(), Value::from(media.url.clone()));
        attrs.insert("title".into(), Value::from(media.original_name.clone()));
        match node_type {
            NodeType::Image => {
                let alt = media.alt_text.clone().unwrap_or_else(|| media.original_name.clone());
                attrs.insert("alt".into(), Value::from(alt));
                if let Some(alignment) = &self.alignment {
                    attrs.insert("alignment".into(), Value::from(alignment.clone()));
                }
            }
            NodeType::DocumentFile => {
                let file_type = media
                    .original_name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_lowercase())
                    .unwrap_or_else(|| media.media_type.clone());
                attrs.insert("fileType".into(), Value::from(file_type));
                if let Some(size) = media.file_size {
                    attrs.insert("fileSize".into(), Value::from(size));
                }
            }
            _ => {}
        }
        attrs
    }
}

impl Command for InsertMedia {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let node_type = media_node_type(&self.media.media_type);
        let node = ctx.schema.node(node_type, self.attrs(node_type))?;
        Ok(insert_block(ctx, node))
    }

    fn display_name(&self) -> &str {
        "Insert Media"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}
