use crate::model::{
    Id,
    group::{Group, GroupMarker},
    user::User,
};
use std::fmt::{Display, Formatter};
use time::UtcDateTime;

/// Number of leading characters of the text a post displays as.
pub const STR_REPR_LEN: usize = 15;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author: User,
    pub group: Option<Group>,
    pub text: String,
    pub pub_date: UtcDateTime,
}

/// The part of a post its author controls.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostContent {
    pub text: String,
    pub group: Option<Id<GroupMarker>>,
}

impl Post {
    #[must_use]
    pub fn content(&self) -> PostContent {
        PostContent {
            text: self.text.clone(),
            group: self.group.as_ref().map(|group| group.id),
        }
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let end = self
            .text
            .char_indices()
            .nth(STR_REPR_LEN)
            .map_or(self.text.len(), |(index, _)| index);

        f.write_str(&self.text[..end])
    }
}
