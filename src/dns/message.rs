use std::fmt;

use super::edns::EdnsOpt;
use super::enums::{RecordClass, RecordType};
use super::name::Name;
use super::record::Record;

/// The question a message asks
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub name: Name,
    pub qtype: RecordType,
    pub qclass: RecordClass,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.name, self.qclass, self.qtype)
    }
}

/// A DNS message as the resolver layer sees it: a query going out or a
/// response coming back. Transport-level encoding is owned by the individual
/// resolvers behind the `Resolver` trait.
#[derive(Clone, Debug, Default)]
pub struct Message {
    pub id: u16,
    pub question: Option<Question>,
    pub answers: Vec<Record>,
    pub authorities: Vec<Record>,
    pub additionals: Vec<Record>,
    pub edns: Option<EdnsOpt>,
}

impl Message {
    /// Build a query message for (name, type) in class IN
    pub fn query(id: u16, name: Name, qtype: RecordType) -> Self {
        Self {
            id,
            question: Some(Question {
                name,
                qtype,
                qclass: RecordClass::IN,
            }),
            ..Default::default()
        }
    }

    /// All records across the answer, authority and additional sections
    pub fn all_records(&self) -> impl Iterator<Item = &Record> {
        self.answers
            .iter()
            .chain(self.authorities.iter())
            .chain(self.additionals.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_construction() {
        let query = Message::query(7, Name::parse("example.com").unwrap(), RecordType::TXT);
        assert_eq!(query.id, 7);
        let question = query.question.unwrap();
        assert_eq!(question.qclass, RecordClass::IN);
        assert_eq!(question.to_string(), "example.com./IN/TXT");
    }
}
