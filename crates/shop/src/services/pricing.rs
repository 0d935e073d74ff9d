//! Context-aware price and display-variant selection.
//!
//! A variant usually carries several prices scoped by country, customer
//! group and validity window. Which one a customer sees depends on their
//! display context, resolved through a specificity-ranked fallback chain.
//!
//! The chain is deliberately sequential, not a best-score computation: later
//! ranks ignore constraints earlier ranks required, and a scoring function
//! would happily pick an expired-but-specific price over a valid static one.
//! Time-bound ranks come first *and* demand a currently-valid window, which
//! is exactly the property a single score cannot express.
//!
//! "No price" is a valid outcome, not an error: it means the variant is not
//! sellable in this context.

use chrono::{DateTime, Utc};
use sunrise_core::{DisplayContext, Price, ProductProjection, Variant};

/// Specificity ranks tried in order. The context-free independent price is
/// the implicit last resort after all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rank {
    /// Country + customer group + currently-valid time window.
    TimeBoundForGroup,
    /// Country + currently-valid time window, any group. Only tried for
    /// contexts that *have* a group; anonymous contexts never degrade group
    /// specificity because rank 1 already matched group-free prices.
    TimeBound,
    /// Country + customer group, validity ignored.
    StaticForGroup,
    /// Country only, any group. Same anonymous-context restriction.
    Static,
}

const RANKS: [Rank; 4] = [
    Rank::TimeBoundForGroup,
    Rank::TimeBound,
    Rank::StaticForGroup,
    Rank::Static,
];

fn in_context_currency(price: &Price, context: &DisplayContext) -> bool {
    context.currency.as_deref() == Some(price.value.currency_code.as_str())
}

fn matches_rank(price: &Price, context: &DisplayContext, now: DateTime<Utc>, rank: Rank) -> bool {
    let country_matches = price.country == context.country;
    match rank {
        Rank::TimeBoundForGroup => {
            country_matches
                && price.customer_group_id == context.customer_group_id
                && price.is_time_bound_and_valid_at(now)
        }
        Rank::TimeBound => {
            context.customer_group_id.is_some()
                && country_matches
                && price.is_time_bound_and_valid_at(now)
        }
        Rank::StaticForGroup => {
            country_matches && price.customer_group_id == context.customer_group_id
        }
        Rank::Static => context.customer_group_id.is_some() && country_matches,
    }
}

/// Select the price to display for a price set under a context.
///
/// Candidates are the prices in the context's currency; within those, the
/// first price matching the highest applicable rank wins (backend order is
/// the only tie-break). Falls back to the independent price - no country, no
/// group, no channel, no window - which never filters by context. `None`
/// means "not sellable in this context".
#[must_use]
pub fn select_price<'a>(
    prices: &'a [Price],
    context: &DisplayContext,
    now: DateTime<Utc>,
) -> Option<&'a Price> {
    let candidates: Vec<&Price> = prices
        .iter()
        .filter(|price| in_context_currency(price, context))
        .collect();

    for rank in RANKS {
        if let Some(price) = candidates
            .iter()
            .find(|price| matches_rank(price, context, now, rank))
        {
            return Some(price);
        }
    }

    candidates
        .iter()
        .find(|price| price.is_independent())
        .copied()
}

/// Rank a product's variants for display under a context.
///
/// A variant qualifies at a rank when at least one of its in-currency prices
/// matches that rank. The result is rank-major: every variant matching rank 1
/// (in catalog order), then previously-unseen variants matching rank 2, and
/// so on. The independent fallback is *not* applied at the variant level; if
/// nothing qualifies at any rank, the first variant carrying any price at all
/// is returned as the last resort.
///
/// Consumers treat `.first()` as "the display variant".
#[must_use]
pub fn display_variants<'a>(
    product: &'a ProductProjection,
    context: &DisplayContext,
    now: DateTime<Utc>,
) -> Vec<&'a Variant> {
    let mut ranked: Vec<&Variant> = Vec::new();

    for rank in RANKS {
        for variant in product.all_variants() {
            if ranked.iter().any(|seen| seen.id == variant.id) {
                continue;
            }
            let qualifies = variant
                .prices
                .iter()
                .filter(|price| in_context_currency(price, context))
                .any(|price| matches_rank(price, context, now, rank));
            if qualifies {
                ranked.push(variant);
            }
        }
    }

    if ranked.is_empty()
        && let Some(variant) = product.all_variants().find(|v| v.has_prices())
    {
        ranked.push(variant);
    }

    ranked
}

/// The single variant to present for a product, if any.
#[must_use]
pub fn display_variant<'a>(
    product: &'a ProductProjection,
    context: &DisplayContext,
    now: DateTime<Utc>,
) -> Option<&'a Variant> {
    display_variants(product, context, now).into_iter().next()
}
