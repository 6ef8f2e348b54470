//! # Message
//!
//! An arbitrary document carrying a `$bag` backreference to its containing
//! bag's name. At any instant a message belongs to exactly one of
//! {absent, available, processing}; that state lives in the storage key
//! prefix, not in the message document itself.

use super::document::Document;
use super::name::Name;

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub document: Document,
    pub bag: Name,
}

impl Message {
    pub fn new(document: Document, bag: Name) -> Self {
        Self { document, bag }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_message() {
        let doc = Document::new("#msg1", "v1", "/bali/permissions/public/v1", "/bali/types/message/v1");
        let bag = Name::parse("/bali/bags/tasks/v1").unwrap();
        let msg = Message::new(doc.clone(), bag.clone());
        assert_eq!(msg.document, doc);
        assert_eq!(msg.bag, bag);
    }
}
