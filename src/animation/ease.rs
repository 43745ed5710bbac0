use crate::error::ConfigError;
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Easing curves, named the way animation markup names them.
///
/// `powerN` curves raise the progress to the power `N + 1`, so `power0` is linear,
/// `power1` quadratic and so on. A bare `powerN` eases out.
///
/// ```
/// # use showroom::animation::Ease;
/// let ease: Ease = "power2.inOut".parse().unwrap();
/// assert_eq!(ease, Ease::PowerInOut(2));
/// assert_eq!(ease.apply(0.5), 0.5);
/// assert_eq!("power0.out".parse::<Ease>().unwrap().apply(0.25), 0.25);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Ease {
    #[default]
    Linear,
    PowerIn(u8),
    PowerOut(u8),
    PowerInOut(u8),
    SineIn,
    SineOut,
    SineInOut,
}

impl Ease {
    /// Maps a linear progress in [0, 1] to an eased progress in [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Ease::Linear => t,
            Ease::PowerIn(n) => t.powi(n as i32 + 1),
            Ease::PowerOut(n) => 1.0 - (1.0 - t).powi(n as i32 + 1),
            Ease::PowerInOut(n) => {
                if t < 0.5 {
                    (2.0 * t).powi(n as i32 + 1) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(n as i32 + 1) / 2.0
                }
            }
            Ease::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Ease::SineOut => (t * PI / 2.0).sin(),
            Ease::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

impl FromStr for Ease {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ConfigError::UnknownEase(s.to_string());
        let (curve, direction) = match s.split_once('.') {
            Some((curve, direction)) => (curve, Some(direction)),
            None => (s, None),
        };

        if curve == "none" || curve == "linear" {
            return match direction {
                None => Ok(Ease::Linear),
                Some(_) => Err(unknown()),
            };
        }

        if curve == "sine" {
            return match direction {
                Some("in") => Ok(Ease::SineIn),
                Some("out") | None => Ok(Ease::SineOut),
                Some("inOut") => Ok(Ease::SineInOut),
                Some(_) => Err(unknown()),
            };
        }

        let power: u8 = curve
            .strip_prefix("power")
            .and_then(|n| n.parse().ok())
            .filter(|n| *n <= 4)
            .ok_or_else(unknown)?;

        match direction {
            Some("in") => Ok(Ease::PowerIn(power)),
            Some("out") | None => Ok(Ease::PowerOut(power)),
            Some("inOut") => Ok(Ease::PowerInOut(power)),
            Some(_) => Err(unknown()),
        }
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ease::Linear => write!(f, "none"),
            Ease::PowerIn(n) => write!(f, "power{}.in", n),
            Ease::PowerOut(n) => write!(f, "power{}.out", n),
            Ease::PowerInOut(n) => write!(f, "power{}.inOut", n),
            Ease::SineIn => write!(f, "sine.in"),
            Ease::SineOut => write!(f, "sine.out"),
            Ease::SineInOut => write!(f, "sine.inOut"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 10] = [
        Ease::Linear,
        Ease::PowerIn(0),
        Ease::PowerIn(1),
        Ease::PowerOut(2),
        Ease::PowerInOut(3),
        Ease::PowerOut(4),
        Ease::SineIn,
        Ease::SineOut,
        Ease::SineInOut,
        Ease::PowerInOut(1),
    ];

    #[test]
    fn curves_start_at_zero_and_end_at_one() {
        for ease in ALL {
            assert!(ease.apply(0.0).abs() < 1.0e-6, "{}", ease);
            assert!((ease.apply(1.0) - 1.0).abs() < 1.0e-6, "{}", ease);
            assert_eq!(ease.apply(-3.0), ease.apply(0.0));
            assert_eq!(ease.apply(7.0), ease.apply(1.0));
        }
    }

    #[test]
    fn directions() {
        assert!(Ease::PowerIn(1).apply(0.5) < 0.5);
        assert!(Ease::PowerOut(1).apply(0.5) > 0.5);
        assert_eq!(Ease::PowerIn(1).apply(0.5), 0.25);
        assert_eq!(Ease::PowerIn(0).apply(0.3), 0.3);
        assert!(Ease::SineIn.apply(0.5) < 0.5);
    }

    #[test]
    fn names() {
        assert_eq!("none".parse::<Ease>().unwrap(), Ease::Linear);
        assert_eq!("power0.in".parse::<Ease>().unwrap(), Ease::PowerIn(0));
        assert_eq!("power1".parse::<Ease>().unwrap(), Ease::PowerOut(1));
        assert_eq!("sine.inOut".parse::<Ease>().unwrap(), Ease::SineInOut);
        assert!("elastic.out".parse::<Ease>().is_err());
        assert!("power9.in".parse::<Ease>().is_err());
        assert!("power1.sideways".parse::<Ease>().is_err());

        for ease in ALL {
            assert_eq!(ease.to_string().parse::<Ease>().unwrap(), ease);
        }
    }
}
