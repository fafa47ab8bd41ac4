// ABOUTME: Configuration for the sanitizer and the template cache.
// ABOUTME: SanitizeOptionsBuilder provides a fluent API mirroring the other builders in the crate.

/// Default number of parsed fragments kept by a [`TemplateCache`](crate::TemplateCache).
pub const DEFAULT_TEMPLATE_CAPACITY: usize = 64;

/// Options recognized by [`sanitize`](crate::sanitize).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Rewrite boolean attributes with a junk value (`hidden="weird"`)
    /// to their canonical empty form.
    pub sanitize_boolean_attributes: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            sanitize_boolean_attributes: true,
        }
    }
}

impl SanitizeOptions {
    /// Start a builder from the default options.
    pub fn builder() -> SanitizeOptionsBuilder {
        SanitizeOptionsBuilder::new()
    }
}

/// Builder for [`SanitizeOptions`].
#[derive(Debug, Clone, Default)]
pub struct SanitizeOptionsBuilder {
    opts: SanitizeOptions,
}

impl SanitizeOptionsBuilder {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self {
            opts: SanitizeOptions::default(),
        }
    }

    /// Enable or disable boolean attribute normalization.
    pub fn sanitize_boolean_attributes(mut self, enabled: bool) -> Self {
        self.opts.sanitize_boolean_attributes = enabled;
        self
    }

    /// Build the options.
    pub fn build(self) -> SanitizeOptions {
        self.opts
    }
}
