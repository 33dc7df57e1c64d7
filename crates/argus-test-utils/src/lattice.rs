//! Assertion helpers for verifying lattice algebraic laws.
//!
//! These check properties over a given set of sample elements and collect
//! all violations into a single report, so every failing law is visible at
//! once rather than one panic at a time.
//!
//! # Example
//!
//! ```
//! use argus_domain::SetDomain;
//! use argus_test_utils::lattice::assert_finite_lattice_laws;
//!
//! // Pass representative elements from your lattice.
//! // Bottom and top are tested automatically.
//! assert_finite_lattice_laws(&[SetDomain::singleton("r0")]);
//! ```

use std::fmt::{Debug, Write};

use argus_domain::{HasBottom, HasTop, Lattice};

/// Collect violations into a `Vec<String>`, then panic with a combined
/// report if any were found.
fn report(violations: Vec<String>) {
    if violations.is_empty() {
        return;
    }
    let mut msg = format!("{} lattice law violation(s):\n", violations.len());
    for (i, violation) in violations.iter().enumerate() {
        let _ = writeln!(msg, "  {}. {}", i + 1, violation);
    }
    panic!("{msg}");
}

/// Check that `join` is commutative, associative, and idempotent over the
/// given elements.
pub fn assert_join_laws<L: Lattice + PartialEq + Debug>(elements: &[L]) {
    let mut violations = Vec::new();
    check_join_laws(elements, &mut violations);
    report(violations);
}

/// Check that `meet` is commutative, associative, and idempotent over the
/// given elements.
pub fn assert_meet_laws<L: Lattice + PartialEq + Debug>(elements: &[L]) {
    let mut violations = Vec::new();
    check_meet_laws(elements, &mut violations);
    report(violations);
}

/// Check all lattice laws over the given elements: join laws, meet laws,
/// absorption, and ordering consistency.
///
/// Pass a representative set of elements — the more diverse the set, the
/// better the coverage. For lattices that also implement [`HasBottom`] and
/// [`HasTop`], use [`assert_finite_lattice_laws`] instead.
pub fn assert_lattice_laws<L: Lattice + PartialEq + Debug>(elements: &[L]) {
    let mut violations = Vec::new();
    check_join_laws(elements, &mut violations);
    check_meet_laws(elements, &mut violations);
    check_absorption(elements, &mut violations);
    check_ordering_consistent(elements, &mut violations);
    report(violations);
}

/// Check the bottom element laws: bottom is below everything, is the
/// identity for join, and absorbs meet.
pub fn assert_bottom_laws<L: HasBottom + PartialEq + Debug>(elements: &[L]) {
    let mut violations = Vec::new();
    check_bottom_laws(elements, &mut violations);
    report(violations);
}

/// Check the top element laws: everything is below top, top absorbs join,
/// and is the identity for meet.
pub fn assert_top_laws<L: HasTop + PartialEq + Debug>(elements: &[L]) {
    let mut violations = Vec::new();
    check_top_laws(elements, &mut violations);
    report(violations);
}

/// Check all lattice laws plus bottom and top element laws, with the
/// provided elements extended by `bottom()` and `top()` automatically.
pub fn assert_finite_lattice_laws<L>(elements: &[L])
where
    L: HasBottom + HasTop + Clone + PartialEq + Debug,
{
    let mut extended: Vec<L> = elements.to_vec();
    extended.push(L::bottom());
    extended.push(L::top());

    let mut violations = Vec::new();
    check_join_laws(&extended, &mut violations);
    check_meet_laws(&extended, &mut violations);
    check_absorption(&extended, &mut violations);
    check_ordering_consistent(&extended, &mut violations);
    check_bottom_laws(&extended, &mut violations);
    check_top_laws(&extended, &mut violations);
    report(violations);
}

// ---- internal helpers that push violations instead of panicking ----

fn check_join_laws<L: Lattice + PartialEq + Debug>(elements: &[L], v: &mut Vec<String>) {
    for a in elements {
        if a.join(a) != *a {
            v.push(format!("join not idempotent at {a:?}"));
        }
        for b in elements {
            if a.join(b) != b.join(a) {
                v.push(format!(
                    "join not commutative: {a:?}.join({b:?}) != {b:?}.join({a:?})"
                ));
            }
            for c in elements {
                if a.join(b).join(c) != a.join(&b.join(c)) {
                    v.push(format!("join not associative over ({a:?}, {b:?}, {c:?})"));
                }
            }
        }
    }
}

fn check_meet_laws<L: Lattice + PartialEq + Debug>(elements: &[L], v: &mut Vec<String>) {
    for a in elements {
        if a.meet(a) != *a {
            v.push(format!("meet not idempotent at {a:?}"));
        }
        for b in elements {
            if a.meet(b) != b.meet(a) {
                v.push(format!(
                    "meet not commutative: {a:?}.meet({b:?}) != {b:?}.meet({a:?})"
                ));
            }
            for c in elements {
                if a.meet(b).meet(c) != a.meet(&b.meet(c)) {
                    v.push(format!("meet not associative over ({a:?}, {b:?}, {c:?})"));
                }
            }
        }
    }
}

fn check_absorption<L: Lattice + PartialEq + Debug>(elements: &[L], v: &mut Vec<String>) {
    for a in elements {
        for b in elements {
            if a.join(&a.meet(b)) != *a {
                v.push(format!("join/meet absorption fails over ({a:?}, {b:?})"));
            }
            if a.meet(&a.join(b)) != *a {
                v.push(format!("meet/join absorption fails over ({a:?}, {b:?})"));
            }
        }
    }
}

fn check_ordering_consistent<L: Lattice + PartialEq + Debug>(elements: &[L], v: &mut Vec<String>) {
    for a in elements {
        for b in elements {
            let le = a.is_subseteq(b);
            if le != (a.join(b) == *b) {
                v.push(format!(
                    "is_subseteq inconsistent with join over ({a:?}, {b:?})"
                ));
            }
            if le != (a.meet(b) == *a) {
                v.push(format!(
                    "is_subseteq inconsistent with meet over ({a:?}, {b:?})"
                ));
            }
        }
    }
}

fn check_bottom_laws<L: HasBottom + PartialEq + Debug>(elements: &[L], v: &mut Vec<String>) {
    let bottom = L::bottom();
    for x in elements {
        if !bottom.is_subseteq(x) {
            v.push(format!("bottom is not below {x:?}"));
        }
        if bottom.join(x) != *x {
            v.push(format!("join with bottom is not identity at {x:?}"));
        }
        if bottom.meet(x) != bottom {
            v.push(format!("meet with bottom is not bottom at {x:?}"));
        }
    }
}

fn check_top_laws<L: HasTop + PartialEq + Debug>(elements: &[L], v: &mut Vec<String>) {
    let top = L::top();
    for x in elements {
        if !x.is_subseteq(&top) {
            v.push(format!("{x:?} is not below top"));
        }
        if top.join(x) != top {
            v.push(format!("join with top is not top at {x:?}"));
        }
        if top.meet(x) != *x {
            v.push(format!("meet with top is not identity at {x:?}"));
        }
    }
}
