//! ID -> display-name mapping transformer.

use std::collections::HashMap;

use crate::ast::traversal::default_rewrite_inline;
use crate::ast::{Document, Inline, Rewriter};

/// Rewrites mention nodes to carry a display name looked up by their
/// canonical ID. IDs absent from the relevant map are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct IdNameMapper {
    pub user_map: HashMap<String, String>,
    pub channel_map: HashMap<String, String>,
    pub usergroup_map: HashMap<String, String>,
}

impl Rewriter for IdNameMapper {
    type Error = std::convert::Infallible;

    fn rewrite_inline(&mut self, inline: Inline) -> Result<Inline, Self::Error> {
        let inline = default_rewrite_inline(self, inline)?;
        Ok(match inline {
            Inline::UserMention { user_id, username } => Inline::UserMention {
                username: self.user_map.get(&user_id).cloned().or(username),
                user_id,
            },
            Inline::ChannelMention { channel_id, channel_name } => Inline::ChannelMention {
                channel_name: self.channel_map.get(&channel_id).cloned().or(channel_name),
                channel_id,
            },
            Inline::UsergroupMention { usergroup_id, usergroup_name } => Inline::UsergroupMention {
                usergroup_name: self.usergroup_map.get(&usergroup_id).cloned().or(usergroup_name),
                usergroup_id,
            },
            other => other,
        })
    }
}

/// Applies `mapper` to `doc`, returning the rewritten document. Infallible:
/// there is no way for a map lookup to fail.
pub fn apply_id_map(doc: Document, mapper: &mut IdNameMapper) -> Document {
    match mapper.rewrite_document(doc) {
        Ok(doc) => doc,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Block;

    #[test]
    fn smoke_test_matching_id_gets_named() {
        let doc = Document::new(vec![Block::Paragraph {
            inlines: vec![Inline::UserMention { user_id: "U1".into(), username: None }],
        }]);
        let mut mapper = IdNameMapper {
            user_map: HashMap::from([("U1".to_string(), "john".to_string())]),
            ..Default::default()
        };
        let out = apply_id_map(doc, &mut mapper);
        match &out.blocks[0] {
            Block::Paragraph { inlines } => match &inlines[0] {
                Inline::UserMention { username, .. } => assert_eq!(username.as_deref(), Some("john")),
                _ => panic!("wrong variant"),
            },
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn smoke_test_non_matching_id_left_unchanged() {
        let doc = Document::new(vec![Block::Paragraph {
            inlines: vec![Inline::UserMention { user_id: "U9".into(), username: Some("existing".into()) }],
        }]);
        let mut mapper = IdNameMapper::default();
        let out = apply_id_map(doc, &mut mapper);
        match &out.blocks[0] {
            Block::Paragraph { inlines } => match &inlines[0] {
                Inline::UserMention { username, .. } => assert_eq!(username.as_deref(), Some("existing")),
                _ => panic!("wrong variant"),
            },
            _ => panic!("wrong variant"),
        }
    }
}
