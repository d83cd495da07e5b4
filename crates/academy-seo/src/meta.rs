//! `<head>` 메타 태그 관리.
//!
//! 문서 head를 태그 목록으로 모델링하고, [`MetaManager`]가 설정값을 upsert한다.
//! 같은 (속성, 키)의 태그는 하나만 유지되며, 내용이 빈 태그는 건너뛴다.

use serde::Serialize;
use tracing::debug;

use crate::types::SeoConfig;

const DEFAULT_OG_TYPE: &str = "website";
const DEFAULT_TWITTER_CARD: &str = "summary_large_image";

/// 메타 태그 키 속성
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaAttribute {
    /// `<meta name="...">`
    Name,
    /// `<meta property="...">` (Open Graph)
    Property,
}

impl MetaAttribute {
    fn as_str(self) -> &'static str {
        match self {
            MetaAttribute::Name => "name",
            MetaAttribute::Property => "property",
        }
    }
}

/// head 안의 태그
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum HeadTag {
    Meta {
        attribute: MetaAttribute,
        key: String,
        content: String,
    },
    Link {
        rel: String,
        href: String,
    },
    JsonLd {
        json: String,
    },
}

/// 문서 head 모델
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadModel {
    pub title: String,
    tags: Vec<HeadTag>,
}

impl HeadModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[HeadTag] {
        &self.tags
    }

    /// 메타 태그 upsert: 빈 내용은 무시
    pub fn set_meta(&mut self, attribute: MetaAttribute, key: &str, content: &str) {
        if content.is_empty() {
            return;
        }
        let existing = self.tags.iter_mut().find_map(|tag| match tag {
            HeadTag::Meta {
                attribute: a,
                key: k,
                content: slot,
            } if *a == attribute && k.as_str() == key => Some(slot),
            _ => None,
        });
        match existing {
            Some(slot) => *slot = content.to_string(),
            None => self.tags.push(HeadTag::Meta {
                attribute,
                key: key.to_string(),
                content: content.to_string(),
            }),
        }
    }

    pub fn set_link(&mut self, rel: &str, href: &str) {
        let existing = self.tags.iter_mut().find_map(|tag| match tag {
            HeadTag::Link { rel: r, href: slot } if r.as_str() == rel => Some(slot),
            _ => None,
        });
        match existing {
            Some(slot) => *slot = href.to_string(),
            None => self.tags.push(HeadTag::Link {
                rel: rel.to_string(),
                href: href.to_string(),
            }),
        }
    }

    /// JSON-LD 스크립트 교체 (하나만 유지)
    pub fn set_structured_data(&mut self, data: &serde_json::Value) {
        let json = data.to_string();
        let existing = self.tags.iter_mut().find_map(|tag| match tag {
            HeadTag::JsonLd { json: slot } => Some(slot),
            _ => None,
        });
        match existing {
            Some(slot) => *slot = json,
            None => self.tags.push(HeadTag::JsonLd { json }),
        }
    }

    pub fn meta(&self, attribute: MetaAttribute, key: &str) -> Option<&str> {
        self.tags.iter().find_map(|tag| match tag {
            HeadTag::Meta {
                attribute: a,
                key: k,
                content,
            } if *a == attribute && k.as_str() == key => Some(content.as_str()),
            _ => None,
        })
    }

    pub fn link(&self, rel: &str) -> Option<&str> {
        self.tags.iter().find_map(|tag| match tag {
            HeadTag::Link { rel: r, href } if r.as_str() == rel => Some(href.as_str()),
            _ => None,
        })
    }

    pub fn structured_data(&self) -> Option<&str> {
        self.tags.iter().find_map(|tag| match tag {
            HeadTag::JsonLd { json } => Some(json.as_str()),
            _ => None,
        })
    }

    /// HTML 조각으로 렌더링
    pub fn render(&self) -> String {
        let mut out = format!("<title>{}</title>\n", escape_html(&self.title));
        for tag in &self.tags {
            match tag {
                HeadTag::Meta {
                    attribute,
                    key,
                    content,
                } => out.push_str(&format!(
                    "<meta {}=\"{}\" content=\"{}\">\n",
                    attribute.as_str(),
                    escape_html(key),
                    escape_html(content)
                )),
                HeadTag::Link { rel, href } => out.push_str(&format!(
                    "<link rel=\"{}\" href=\"{}\">\n",
                    escape_html(rel),
                    escape_html(href)
                )),
                HeadTag::JsonLd { json } => out.push_str(&format!(
                    "<script type=\"application/ld+json\">{}</script>\n",
                    json.replace("</", "<\\/")
                )),
            }
        }
        out
    }
}

/// 설정값을 head 모델에 반영
#[derive(Debug, Clone)]
pub struct MetaManager {
    config: SeoConfig,
}

impl MetaManager {
    pub fn new(config: SeoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SeoConfig {
        &self.config
    }

    pub fn update_meta(&self, head: &mut HeadModel) {
        let c = &self.config;
        let og_image = c.og_image.as_deref().unwrap_or_default();

        head.title = c.title.clone();

        head.set_meta(MetaAttribute::Name, "description", &c.description);
        head.set_meta(MetaAttribute::Name, "keywords", &c.keywords.join(", "));
        head.set_meta(
            MetaAttribute::Name,
            "author",
            c.author.as_deref().unwrap_or_default(),
        );

        head.set_meta(MetaAttribute::Property, "og:title", &c.title);
        head.set_meta(MetaAttribute::Property, "og:description", &c.description);
        head.set_meta(
            MetaAttribute::Property,
            "og:type",
            c.og_type.as_deref().unwrap_or(DEFAULT_OG_TYPE),
        );
        head.set_meta(MetaAttribute::Property, "og:image", og_image);

        head.set_meta(
            MetaAttribute::Name,
            "twitter:card",
            c.twitter_card.as_deref().unwrap_or(DEFAULT_TWITTER_CARD),
        );
        head.set_meta(MetaAttribute::Name, "twitter:title", &c.title);
        head.set_meta(MetaAttribute::Name, "twitter:description", &c.description);
        head.set_meta(MetaAttribute::Name, "twitter:image", og_image);

        if let Some(canonical) = c.canonical_url.as_deref() {
            head.set_link("canonical", canonical);
        }
        if let Some(data) = c.structured_data.as_ref() {
            head.set_structured_data(data);
        }
        debug!("메타 태그 갱신: {} ({}개)", head.title, head.tags().len());
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SeoConfig {
        SeoConfig {
            title: "AIacademy | Learn AI by building".to_string(),
            description: "Hands-on AI courses".to_string(),
            keywords: vec!["ai".to_string(), "machine learning".to_string()],
            canonical_url: Some("https://aiacademy.example.com/".to_string()),
            structured_data: Some(serde_json::json!({"@type": "Organization"})),
            ..SeoConfig::default()
        }
    }

    #[test]
    fn update_meta_fills_defaults_and_skips_empty() {
        let mut head = HeadModel::new();
        MetaManager::new(config()).update_meta(&mut head);

        assert_eq!(head.title, "AIacademy | Learn AI by building");
        assert_eq!(
            head.meta(MetaAttribute::Name, "keywords"),
            Some("ai, machine learning")
        );
        assert_eq!(head.meta(MetaAttribute::Property, "og:type"), Some("website"));
        assert_eq!(
            head.meta(MetaAttribute::Name, "twitter:card"),
            Some("summary_large_image")
        );
        assert!(head.meta(MetaAttribute::Name, "author").is_none());
        assert!(head.meta(MetaAttribute::Property, "og:image").is_none());
        assert_eq!(head.link("canonical"), Some("https://aiacademy.example.com/"));
        assert!(head.structured_data().unwrap().contains("Organization"));
    }

    #[test]
    fn repeated_update_does_not_duplicate_tags() {
        let mut head = HeadModel::new();
        let manager = MetaManager::new(config());
        manager.update_meta(&mut head);
        let count = head.tags().len();

        let mut changed = config();
        changed.description = "Updated".to_string();
        MetaManager::new(changed).update_meta(&mut head);

        assert_eq!(head.tags().len(), count);
        assert_eq!(head.meta(MetaAttribute::Name, "description"), Some("Updated"));
    }

    #[test]
    fn render_escapes_attributes() {
        let mut head = HeadModel::new();
        head.title = "Q&A".to_string();
        head.set_meta(MetaAttribute::Name, "description", "say \"hi\" <now>");
        head.set_structured_data(&serde_json::json!({"text": "</script>"}));

        let html = head.render();
        assert!(html.contains("<title>Q&amp;A</title>"));
        assert!(html.contains("content=\"say &quot;hi&quot; &lt;now&gt;\""));
        assert!(!html.contains("</script>\"}"));
    }
}
