// crates/script-gate-predicates/src/context.rs
// ============================================================================
// Module: Request Context
// Description: Serializable snapshot of the current request.
// Purpose: Give predicates a stable, read-only view of one page request.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The host builds one [`RequestContext`] per request. Every field defaults,
//! so a context can be written as sparse JSON naming only what holds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Snapshot of the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestContext {
    /// Request targets the administration area (including admin AJAX).
    pub admin: bool,
    /// Request is an AJAX call.
    pub ajax: bool,
    /// Visitor is authenticated.
    pub logged_in: bool,
    /// Capabilities granted to the visitor.
    pub capabilities: BTreeSet<String>,
    /// Visitor device is classified as mobile.
    pub mobile: bool,
    /// Request is the blog posts index.
    pub home: bool,
    /// Request is the site front page.
    pub front_page: bool,
    /// Request is a search results page.
    pub search: bool,
    /// Request resolved to nothing.
    pub not_found: bool,
    /// Request is page two or later of a listing.
    pub paged: bool,
    /// Request is the privacy policy page.
    pub privacy_policy: bool,
    /// Comments are open on the queried post.
    pub comments_open: bool,
    /// Object the request resolved to.
    pub queried: Option<QueriedObject>,
}

/// Object a request resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueriedObject {
    /// Single post of any type.
    Post(PostContext),
    /// Taxonomy term archive.
    Term(TermContext),
    /// Post type archive.
    PostTypeArchive {
        /// Archived post type.
        post_type: String,
    },
    /// Author archive.
    Author(AuthorContext),
    /// Date archive.
    Date,
}

/// Single post details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostContext {
    /// Post type, e.g. `post` or `page`.
    pub post_type: String,
    /// Post id.
    pub id: i64,
    /// Post slug.
    pub slug: String,
    /// Post title.
    pub title: String,
    /// Assigned page template file, when any.
    pub template: Option<String>,
    /// Terms attached to the post.
    pub terms: Vec<TermRef>,
}

/// Term archive details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermContext {
    /// Taxonomy name.
    pub taxonomy: String,
    /// Term id.
    pub id: i64,
    /// Term slug.
    pub slug: String,
    /// Term display name.
    pub name: String,
}

/// Term attached to a post.
pub type TermRef = TermContext;

/// Author archive details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorContext {
    /// Author id.
    pub id: i64,
    /// Author slug.
    pub slug: String,
}

impl RequestContext {
    /// Returns the queried post, if any.
    #[must_use]
    pub const fn post(&self) -> Option<&PostContext> {
        match &self.queried {
            Some(QueriedObject::Post(post)) => Some(post),
            _ => None,
        }
    }

    /// Returns the queried term archive, if any.
    #[must_use]
    pub const fn term(&self) -> Option<&TermContext> {
        match &self.queried {
            Some(QueriedObject::Term(term)) => Some(term),
            _ => None,
        }
    }
}
