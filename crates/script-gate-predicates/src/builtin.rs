// crates/script-gate-predicates/src/builtin.rs
// ============================================================================
// Module: Built-in Predicates
// Description: Default predicate vocabulary over RequestContext.
// Purpose: Register request, visitor, and content predicates by name.
// Dependencies: script-gate-core, crate::context
// ============================================================================

//! ## Overview
//! Built-in predicates mirror common page conditionals. Argument matching is
//! loose in the way operators expect: a term or post argument matches its
//! numeric id, slug, or display name. Multi-argument predicates treat extra
//! arguments as alternatives.

// ============================================================================
// SECTION: Imports
// ============================================================================

use script_gate_core::Arity;
use script_gate_core::FRONTEND_PREDICATE;
use script_gate_core::PredicateAccessPolicy;
use script_gate_core::PredicateRegistry;
use script_gate_core::RegistryError;
use script_gate_core::Scalar;

use crate::context::QueriedObject;
use crate::context::RequestContext;
use crate::context::TermContext;

// ============================================================================
// SECTION: Registry Construction
// ============================================================================

/// Builds a registry holding every built-in predicate.
///
/// # Errors
///
/// Returns [`RegistryError`] if a built-in name is rejected.
pub fn builtin_registry(policy: PredicateAccessPolicy) -> Result<PredicateRegistry<RequestContext>, RegistryError> {
    let mut registry = PredicateRegistry::new(policy);
    register_builtin_predicates(&mut registry)?;
    Ok(registry)
}

/// Registers every built-in predicate.
///
/// # Errors
///
/// Returns [`RegistryError`] if a name is already registered.
pub fn register_builtin_predicates(registry: &mut PredicateRegistry<RequestContext>) -> Result<(), RegistryError> {
    registry.register(FRONTEND_PREDICATE, Arity::None, |ctx: &RequestContext, _: &[Scalar]| !ctx.admin)?;
    registry.register("is_admin", Arity::None, |ctx: &RequestContext, _: &[Scalar]| ctx.admin)?;
    registry.register("is_user_logged_in", Arity::None, |ctx: &RequestContext, _: &[Scalar]| ctx.logged_in)?;
    registry.register("is_logged_out", Arity::None, |ctx: &RequestContext, _: &[Scalar]| !ctx.logged_in)?;
    registry.register("is_mobile", Arity::None, |ctx: &RequestContext, _: &[Scalar]| ctx.mobile)?;
    registry.register("is_home", Arity::None, |ctx: &RequestContext, _: &[Scalar]| ctx.home)?;
    registry.register("is_front_page", Arity::None, |ctx: &RequestContext, _: &[Scalar]| ctx.front_page)?;
    registry.register("is_search", Arity::None, |ctx: &RequestContext, _: &[Scalar]| ctx.search)?;
    registry.register("is_404", Arity::None, |ctx: &RequestContext, _: &[Scalar]| ctx.not_found)?;
    registry.register("is_paged", Arity::None, |ctx: &RequestContext, _: &[Scalar]| ctx.paged)?;
    registry.register("is_privacy_policy", Arity::None, |ctx: &RequestContext, _: &[Scalar]| ctx.privacy_policy)?;
    registry.register("comments_open", Arity::None, |ctx: &RequestContext, _: &[Scalar]| ctx.comments_open)?;
    registry.register("is_archive", Arity::None, is_archive)?;
    registry.register("is_singular", Arity::Many, is_singular)?;
    registry.register("is_page", Arity::One, is_page)?;
    registry.register("is_post_type_archive", Arity::One, is_post_type_archive)?;
    registry.register("is_tax", Arity::Many, is_tax)?;
    registry.register("is_category", Arity::One, |ctx: &RequestContext, args: &[Scalar]| {
        term_archive_in(ctx, "category", args.first())
    })?;
    registry.register("is_tag", Arity::One, |ctx: &RequestContext, args: &[Scalar]| {
        term_archive_in(ctx, "post_tag", args.first())
    })?;
    registry.register("has_term", Arity::Many, has_term)?;
    registry.register("is_page_template", Arity::One, is_page_template)?;
    registry.register("current_user_can", Arity::One, current_user_can)?;
    Ok(())
}

// ============================================================================
// SECTION: Content Predicates
// ============================================================================

/// True for term, post type, author, and date archives.
fn is_archive(ctx: &RequestContext, _: &[Scalar]) -> bool {
    matches!(
        ctx.queried,
        Some(
            QueriedObject::Term(_)
                | QueriedObject::PostTypeArchive { .. }
                | QueriedObject::Author(_)
                | QueriedObject::Date
        )
    )
}

/// True for a single post whose type is any of the arguments (or any type).
fn is_singular(ctx: &RequestContext, args: &[Scalar]) -> bool {
    ctx.post().is_some_and(|post| args.is_empty() || args.iter().any(|arg| arg.as_str() == Some(post.post_type.as_str())))
}

/// True for a page, optionally matching id, slug, or title.
fn is_page(ctx: &RequestContext, args: &[Scalar]) -> bool {
    ctx.post().filter(|post| post.post_type == "page").is_some_and(|post| {
        args.first().is_none_or(|arg| matches_object(arg, post.id, &post.slug, &post.title))
    })
}

/// True for a post type archive, optionally of a given type.
fn is_post_type_archive(ctx: &RequestContext, args: &[Scalar]) -> bool {
    match &ctx.queried {
        Some(QueriedObject::PostTypeArchive {
            post_type,
        }) => args.first().is_none_or(|arg| arg.as_str() == Some(post_type.as_str())),
        _ => false,
    }
}

/// `is_tax(taxonomy, term...)`: term archive in a taxonomy, optionally for
/// any of the listed terms.
fn is_tax(ctx: &RequestContext, args: &[Scalar]) -> bool {
    let Some(term) = ctx.term() else {
        return false;
    };
    let Some((taxonomy, terms)) = args.split_first() else {
        return true;
    };
    taxonomy.as_str() == Some(term.taxonomy.as_str()) && (terms.is_empty() || terms.iter().any(|arg| matches_term(arg, term)))
}

/// `has_term(term, taxonomy)`: the queried post carries a matching term.
/// An empty term matches any term; a missing taxonomy matches any taxonomy.
fn has_term(ctx: &RequestContext, args: &[Scalar]) -> bool {
    let Some(post) = ctx.post() else {
        return false;
    };
    let wanted_term = args.first().filter(|arg| !is_blank(arg));
    let wanted_taxonomy = args.get(1).and_then(Scalar::as_str).filter(|taxonomy| !taxonomy.is_empty());
    post.terms.iter().any(|term| {
        wanted_taxonomy.is_none_or(|taxonomy| term.taxonomy == taxonomy)
            && wanted_term.is_none_or(|arg| matches_term(arg, term))
    })
}

/// True when the queried post uses a template, optionally a specific file.
fn is_page_template(ctx: &RequestContext, args: &[Scalar]) -> bool {
    let Some(template) = ctx.post().and_then(|post| post.template.as_deref()).filter(|file| !file.is_empty()) else {
        return false;
    };
    args.first().is_none_or(|arg| arg.as_str() == Some(template))
}

// ============================================================================
// SECTION: Visitor Predicates
// ============================================================================

/// True when the visitor holds the named capability.
fn current_user_can(ctx: &RequestContext, args: &[Scalar]) -> bool {
    args.first().and_then(Scalar::as_str).is_some_and(|capability| ctx.capabilities.contains(capability))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// True for a term archive in `taxonomy`, optionally for a specific term.
fn term_archive_in(ctx: &RequestContext, taxonomy: &str, wanted: Option<&Scalar>) -> bool {
    ctx.term()
        .filter(|term| term.taxonomy == taxonomy)
        .is_some_and(|term| wanted.is_none_or(|arg| matches_term(arg, term)))
}

/// Matches an argument against a term's id, slug, or name.
fn matches_term(arg: &Scalar, term: &TermContext) -> bool {
    matches_object(arg, term.id, &term.slug, &term.name)
}

/// Matches an argument against an id, slug, or display label.
fn matches_object(arg: &Scalar, id: i64, slug: &str, label: &str) -> bool {
    if arg.as_i64() == Some(id) {
        return true;
    }
    arg.as_str().is_some_and(|text| text == slug || text == label)
}

/// True for an empty string argument.
fn is_blank(arg: &Scalar) -> bool {
    arg.as_str().is_some_and(str::is_empty)
}
