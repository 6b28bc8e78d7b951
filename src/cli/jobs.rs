use std::{fmt::Display, num::NonZeroUsize, str::FromStr};

/// How many root makefiles are resolved at the same time.
///
/// Never more than the number of roots, so a single makefile is always
/// resolved on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Jobs {
    /// One per logical CPU.
    #[default]
    Auto,
    Fixed(NonZeroUsize),
}

impl Jobs {
    pub fn for_roots(self, roots: usize) -> usize {
        let limit = match self {
            Jobs::Auto => num_cpus::get(),
            Jobs::Fixed(n) => n.get(),
        };
        limit.min(roots).max(1)
    }
}

impl FromStr for Jobs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Jobs::Auto);
        }
        s.parse::<NonZeroUsize>()
            .map(Jobs::Fixed)
            .map_err(|_| format!("expected `auto` or how many makefiles to read at once (at least 1), got `{s}`"))
    }
}

impl Display for Jobs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Jobs::Auto => write!(f, "auto"),
            Jobs::Fixed(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(n: usize) -> Jobs {
        Jobs::Fixed(NonZeroUsize::new(n).unwrap())
    }

    #[test]
    fn parse() {
        assert_eq!("auto".parse::<Jobs>(), Ok(Jobs::Auto));
        assert_eq!("AUTO".parse::<Jobs>(), Ok(Jobs::Auto));
        assert_eq!("3".parse::<Jobs>(), Ok(fixed(3)));

        let err = "0".parse::<Jobs>().unwrap_err();
        assert!(err.contains("`0`"));
        assert!("many".parse::<Jobs>().is_err());
    }

    #[test]
    fn bounded_by_the_number_of_roots() {
        assert_eq!(fixed(8).for_roots(3), 3);
        assert_eq!(fixed(2).for_roots(5), 2);
        assert_eq!(Jobs::Auto.for_roots(1), 1);
        assert_eq!(Jobs::Auto.for_roots(0), 1);
        assert!(Jobs::Auto.for_roots(usize::MAX) >= 1);
    }

    #[test]
    fn display_round_trips_through_parse() {
        assert_eq!(Jobs::Auto.to_string(), "auto");
        assert_eq!(fixed(4).to_string().parse::<Jobs>(), Ok(fixed(4)));
    }
}
