//! In-memory blog served by the demo commands.

use chrono::{DateTime, Utc};
use hypercast::v1::{
    Error, Identifier, LongIdentifier, PathIdentifierMapper, RegistrationPolicy, ResourceRegistry,
    Result, SingleModel,
};
use std::any::Any;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BlogPosting {
    pub id: i64,
    pub headline: String,
    pub alternative_headline: Option<String>,
    pub article_body: String,
    pub date_published: DateTime<Utc>,
    pub author_id: i64,
    pub rating: Option<RatingId>,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub blog_id: i64,
    pub author_id: i64,
    pub text: String,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AggregateRating {
    pub id: RatingId,
    pub rating_value: f64,
    pub review_count: u32,
}

/// Ratings are keyed by the panel that gave them and a number, e.g.
/// `editors:7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RatingId {
    pub panel: String,
    pub number: i64,
}

impl Identifier for RatingId {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RatingIdMapper;

impl PathIdentifierMapper for RatingIdMapper {
    type Id = RatingId;

    fn to_id(&self, identifier: &RatingId, _registry: &ResourceRegistry) -> Result<String> {
        Ok(format!("{}:{}", identifier.panel, identifier.number))
    }

    fn from_id(&self, id: &str, _registry: &ResourceRegistry) -> Result<RatingId> {
        let (panel, number) = id
            .split_once(':')
            .filter(|(panel, _)| !panel.is_empty())
            .ok_or_else(|| Error::BadRequest(format!("{id:?} should be panel:number")))?;
        let number = number
            .parse::<i64>()
            .map_err(|_| Error::BadRequest(format!("{id:?} should end in a number")))?;
        Ok(RatingId {
            panel: panel.to_string(),
            number,
        })
    }
}

// 2026-01-01T09:00:00Z
const FIRST_DAY: i64 = 1_767_258_000;

fn day(n: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(FIRST_DAY + n * 86_400, 0).unwrap_or_default()
}

const HEADLINES: [&str; 12] = [
    "Hello, world",
    "Counting with cards",
    "Why bugs are called bugs",
    "On computable numbers",
    "Loops, unrolled",
    "The case for compilers",
    "Notes on the Analytical Engine",
    "Teaching machines to play chess",
    "Debugging by moth light",
    "Bernoulli numbers by hand",
    "What a nanosecond looks like",
    "The imitation game",
];

pub struct Library {
    people: Vec<Person>,
    blogs: Vec<BlogPosting>,
    comments: Vec<Comment>,
    ratings: Vec<AggregateRating>,
}

impl Library {
    pub fn sample() -> Self {
        let people = vec![
            Person {
                id: 1,
                name: "Ada Lovelace".into(),
                email: Some("ada@example.com".into()),
            },
            Person {
                id: 2,
                name: "Grace Hopper".into(),
                email: None,
            },
            Person {
                id: 3,
                name: "Alan Turing".into(),
                email: Some("alan@example.com".into()),
            },
        ];

        let blogs = HEADLINES
            .iter()
            .enumerate()
            .map(|(i, headline)| {
                let id = i as i64 + 1;
                BlogPosting {
                    id,
                    headline: headline.to_string(),
                    alternative_headline: (id % 4 == 0).then(|| format!("Part {} of the series", id / 4)),
                    article_body: format!("{headline}. A short post, number {id}."),
                    date_published: day(id),
                    author_id: (id - 1) % 3 + 1,
                    rating: match id {
                        7 => Some(RatingId {
                            panel: "editors".into(),
                            number: 7,
                        }),
                        3 => Some(RatingId {
                            panel: "readers".into(),
                            number: 3,
                        }),
                        _ => None,
                    },
                }
            })
            .collect();

        let comments = vec![
            Comment {
                id: 1,
                blog_id: 7,
                author_id: 3,
                text: "The notes are longer than the paper.".into(),
                date_created: day(8),
            },
            Comment {
                id: 2,
                blog_id: 7,
                author_id: 2,
                text: "And more influential.".into(),
                date_created: day(9),
            },
            Comment {
                id: 3,
                blog_id: 7,
                author_id: 1,
                text: "Thank you both.".into(),
                date_created: day(9),
            },
            Comment {
                id: 4,
                blog_id: 1,
                author_id: 2,
                text: "First!".into(),
                date_created: day(2),
            },
        ];

        let ratings = vec![
            AggregateRating {
                id: RatingId {
                    panel: "editors".into(),
                    number: 7,
                },
                rating_value: 4.8,
                review_count: 12,
            },
            AggregateRating {
                id: RatingId {
                    panel: "readers".into(),
                    number: 3,
                },
                rating_value: 4.1,
                review_count: 57,
            },
        ];

        Self {
            people,
            blogs,
            comments,
            ratings,
        }
    }

    pub fn person(&self, id: i64) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    pub fn blog(&self, id: i64) -> Option<&BlogPosting> {
        self.blogs.iter().find(|b| b.id == id)
    }

    pub fn comment(&self, id: i64) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    pub fn rating(&self, id: &RatingId) -> Option<&AggregateRating> {
        self.ratings.iter().find(|r| &r.id == id)
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn blogs(&self) -> &[BlogPosting] {
        &self.blogs
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn ratings(&self) -> &[AggregateRating] {
        &self.ratings
    }

    pub fn blogs_by(&self, person_id: i64) -> Vec<BlogPosting> {
        self.blogs
            .iter()
            .filter(|b| b.author_id == person_id)
            .cloned()
            .collect()
    }

    pub fn comments_on(&self, blog_id: i64) -> Vec<Comment> {
        self.comments
            .iter()
            .filter(|c| c.blog_id == blog_id)
            .cloned()
            .collect()
    }

    /// The model a resource name and identifier address.
    pub fn find(&self, name: &str, identifier: &dyn Identifier) -> Option<SingleModel> {
        let long_id = || identifier.downcast_ref::<LongIdentifier>().map(LongIdentifier::id);
        match name {
            "people" => long_id()
                .and_then(|id| self.person(id))
                .cloned()
                .map(SingleModel::new),
            "blogs" => long_id()
                .and_then(|id| self.blog(id))
                .cloned()
                .map(SingleModel::new),
            "comments" => long_id()
                .and_then(|id| self.comment(id))
                .cloned()
                .map(SingleModel::new),
            "ratings" => identifier
                .downcast_ref::<RatingId>()
                .and_then(|id| self.rating(id))
                .cloned()
                .map(SingleModel::new),
            _ => None,
        }
    }
}

/// Register the sample resources. Relations resolve against `library`.
pub fn registry(library: &Arc<Library>, policy: RegistrationPolicy) -> Result<ResourceRegistry> {
    let registry = ResourceRegistry::with_policy(policy);

    registry.register_resource::<Person>("people", |b| {
        b.identifier(|p| LongIdentifier(p.id))
            .add_type("Person")
            .add_field("name", |p| p.name.clone())
            .add_field("email", |p| p.email.clone())
    })?;

    let authors = Arc::clone(library);
    let ratings = Arc::clone(library);
    registry.register_resource::<BlogPosting>("blogs", move |b| {
        b.identifier(|p| LongIdentifier(p.id))
            .add_type("BlogPosting")
            .add_field("headline", |p| p.headline.clone())
            .add_field("alternativeHeadline", |p| p.alternative_headline.clone())
            .add_field("datePublished", |p| p.date_published)
            .add_field("wordCount", |p| p.article_body.split_whitespace().count())
            .add_link("license", "https://creativecommons.org/licenses/by/4.0/")
            .add_binary("articleBody", |p| Cursor::new(p.article_body.clone().into_bytes()))
            .add_bidirectional_model(
                "author",
                "blogs",
                move |p| authors.person(p.author_id).cloned(),
                |person: &Person| LongIdentifier(person.id),
            )
            .add_embedded_model("aggregateRating", move |p| {
                p.rating.as_ref().and_then(|id| ratings.rating(id)).cloned()
            })
            .add_related_collection::<Comment, _, _>("comment", |p| LongIdentifier(p.id))
    })?;

    let authors = Arc::clone(library);
    let posts = Arc::clone(library);
    registry.register_resource::<Comment>("comments", move |b| {
        b.identifier(|c| LongIdentifier(c.id))
            .add_type("Comment")
            .add_field("text", |c| c.text.clone())
            .add_field("dateCreated", |c| c.date_created)
            .add_linked_model("author", move |c| authors.person(c.author_id).cloned())
            .add_linked_model("about", move |c| posts.blog(c.blog_id).cloned())
    })?;

    registry.register_resource::<AggregateRating>("ratings", |b| {
        b.identifier(|r| r.id.clone())
            .add_type("AggregateRating")
            .add_field("ratingValue", |r| r.rating_value)
            .add_field("reviewCount", |r| r.review_count)
    })?;

    Ok(registry)
}
