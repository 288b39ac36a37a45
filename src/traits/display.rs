//! Display abstraction for short status messages.
//!
//! The slide controller drives a two-line character LCD. The core only needs
//! to put two lines of text on it, so that is all [`StatusDisplay`] asks for.

/// Two-line status display.
///
/// Rendering is best-effort: callers in this crate ignore the returned error
/// after logging it, a broken display never stops run tracking.
///
/// # Example
///
/// ```rust
/// use slide_timer::traits::StatusDisplay;
///
/// struct Lcd;
///
/// impl StatusDisplay for Lcd {
///     type Error = ();
///
///     fn show(&mut self, line1: &str, line2: &str) -> Result<(), ()> {
///         // clear, write line1 at (0, 0), write line2 at (0, 1)
///         Ok(())
///     }
/// }
/// ```
pub trait StatusDisplay {
    /// Error type for display operations.
    type Error: core::fmt::Debug;

    /// Clears the display and shows two lines of text.
    ///
    /// Either line may be empty.
    fn show(&mut self, line1: &str, line2: &str) -> Result<(), Self::Error>;

    /// Shows a single line, leaving the second line blank.
    fn show_line(&mut self, line1: &str) -> Result<(), Self::Error> {
        self.show(line1, "")
    }
}

impl<D: StatusDisplay + ?Sized> StatusDisplay for &mut D {
    type Error = D::Error;

    fn show(&mut self, line1: &str, line2: &str) -> Result<(), Self::Error> {
        (**self).show(line1, line2)
    }
}
