//! Channel mode and permission engine.
//!
//! Interprets mode strings against the server's advertised `CHANMODES` and
//! `PREFIX` tokens, keeps the live settings of each channel, and derives
//! per-user permission levels.

mod parse;
mod perms;
mod set;
mod table;
mod types;

pub use self::perms::{UserPermissions, parse_user_prefix};
pub use self::set::ModeSet;
pub use self::table::{ModeTable, is_valid_chanmodes, is_valid_prefixes, parse_prefixes};
pub use self::types::{Classification, ModeChange};

/// Classification used until the server advertises `CHANMODES`.
pub const DEFAULT_CHANMODES: &str = "beI,k,l,imnpst";

/// Prefix table used until the server advertises `PREFIX`.
pub const DEFAULT_PREFIXES: &str = "(ov)@+";

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn flags() -> impl Strategy<Value = String> {
        "[+-]?[beIklimnpstov+-]{0,12}"
    }

    fn args() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-z0-9*!@]{1,8}", 0..8)
    }

    proptest! {
        #[test]
        fn merge_twice_equals_merge_once(f in flags(), a in args()) {
            let mut once = ModeSet::default();
            let changes = once.parse(&f, &a);
            once.merge(&changes);

            let mut twice = once.clone();
            twice.merge(&changes);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn rendered_set_parses_back_to_itself(f in flags(), a in args()) {
            let mut original = ModeSet::default();
            let changes = original.parse(&f, &a);
            original.merge(&changes);

            let rendered = original.render();
            let mut words = rendered.split(' ');
            let flag_str = words.next().unwrap_or("");
            let rest: Vec<&str> = words.collect();

            let mut reparsed = ModeSet::default();
            let changes = reparsed.parse(flag_str, &rest);
            reparsed.merge(&changes);
            prop_assert_eq!(original.render(), reparsed.render());
        }

        #[test]
        fn list_modes_always_take_args(add in any::<bool>(), m in "[beI]") {
            let c = m.chars().next().unwrap_or('b');
            let cl = ModeTable::default().classify(add, c);
            prop_assert!(cl.has_arg);
            prop_assert!(!cl.persistent);
        }

        #[test]
        fn flag_modes_never_take_args(add in any::<bool>(), m in "[imnpst]") {
            let c = m.chars().next().unwrap_or('m');
            let cl = ModeTable::default().classify(add, c);
            prop_assert!(!cl.has_arg);
            prop_assert!(cl.persistent);
        }

        #[test]
        fn stored_modes_are_unique(f in flags(), a in args()) {
            let mut set = ModeSet::default();
            let changes = set.parse(&f, &a);
            set.merge(&changes);
            let mut seen: Vec<char> = set.modes().iter().map(|m| m.mode).collect();
            let before = seen.len();
            seen.sort_unstable();
            seen.dedup();
            prop_assert_eq!(before, seen.len());
        }
    }
}
