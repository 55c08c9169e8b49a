//! Mode string parsing.

use super::table::ModeTable;
use super::types::ModeChange;

impl ModeTable {
    /// Parse a flag string like `+o-v+l` and its arguments into changes.
    ///
    /// `+` and `-` switch polarity and are not modes themselves. Arguments
    /// are matched to argument-taking modes strictly by position; a mode
    /// that would take an argument when none is left (a list query such as
    /// `MODE #chan +b`) gets `None`.
    ///
    /// ```
    /// use slirc_client::mode::ModeTable;
    ///
    /// let table = ModeTable::new("beI,k,l,imnpst", "(ov)@+");
    /// let changes = table.parse_flags("+ntk-o", &["secret", "alice"]);
    /// let rendered: Vec<String> = changes.iter().map(ToString::to_string).collect();
    /// assert_eq!(rendered, ["+n", "+t", "+k secret", "-o alice"]);
    /// ```
    pub fn parse_flags<S: AsRef<str>>(&self, flags: &str, args: &[S]) -> Vec<ModeChange> {
        let mut add = true;
        let mut args = args.iter().map(AsRef::as_ref);
        let mut out = Vec::with_capacity(flags.len());

        for c in flags.chars() {
            match c {
                '+' => add = true,
                '-' => add = false,
                _ => {
                    let class = self.classify(add, c);
                    let arg = if class.has_arg {
                        args.next().map(str::to_string)
                    } else {
                        None
                    };
                    out.push(ModeChange {
                        add,
                        mode: c,
                        persistent: class.persistent,
                        arg,
                    });
                }
            }
        }

        out
    }
}
