//! Closure-backed sink.

use crate::sink::Sink;
use crate::{Frame, SinkError};

type Callback = Box<dyn Fn(&Frame<'_>) -> Result<(), SinkError> + Send + Sync>;

/// A sink that calls a closure for every frame.
///
/// The closure runs on the pumping side and receives a borrowed [`Frame`];
/// copy it with [`Frame::to_line()`] to keep it.
///
/// # Example
///
/// ```
/// use stream_log::CallbackSink;
///
/// let sink = CallbackSink::new(|frame| {
///     print!("{}", String::from_utf8_lossy(frame.payload()));
/// });
/// ```
pub struct CallbackSink {
    name: String,
    callback: Callback,
}

impl CallbackSink {
    /// Creates a sink from an infallible closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Frame<'_>) + Send + Sync + 'static,
    {
        Self::with_name("callback", f)
    }

    /// Creates an infallible closure sink with a custom name.
    pub fn with_name<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Frame<'_>) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callback: Box::new(move |frame| {
                f(frame);
                Ok(())
            }),
        }
    }

    /// Creates a sink from a closure whose errors are reported as events.
    pub fn fallible<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Frame<'_>) -> Result<(), SinkError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callback: Box::new(f),
        }
    }
}

impl Sink for CallbackSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, frame: &Frame<'_>) -> Result<(), SinkError> {
        (self.callback)(frame)
    }
}
