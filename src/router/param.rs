use std::fmt::Display;
use std::str::FromStr;

/// A value that can be read from and written to a single path segment or query value.
pub trait RouteParam: Sized {
    fn from_param(s: &str) -> Option<Self>;
    fn to_param(&self) -> String;
}

impl<T> RouteParam for T
where
    T: FromStr + Display,
{
    fn from_param(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    fn to_param(&self) -> String {
        self.to_string()
    }
}

/// Literal path segments accepted by `Router::path`.
///
/// Leading `/` are stripped from every segment; segments that end up empty are skipped,
/// as are `None` and empty collections.
pub trait PathSegments {
    fn segments(self) -> Vec<String>;
}

/// Strips any leading "/" from a segment.
pub(crate) fn sanitize(segment: &str) -> &str {
    segment.trim_start_matches('/')
}

fn collect<I, S>(segments: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| sanitize(s.as_ref()).to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl PathSegments for &str {
    fn segments(self) -> Vec<String> {
        collect([self])
    }
}

impl PathSegments for String {
    fn segments(self) -> Vec<String> {
        collect([self])
    }
}

impl<S: AsRef<str>, const N: usize> PathSegments for [S; N] {
    fn segments(self) -> Vec<String> {
        collect(self)
    }
}

impl<S: AsRef<str>> PathSegments for &[S] {
    fn segments(self) -> Vec<String> {
        collect(self)
    }
}

impl<S: AsRef<str>> PathSegments for Vec<S> {
    fn segments(self) -> Vec<String> {
        collect(self)
    }
}

impl<P: PathSegments> PathSegments for Option<P> {
    fn segments(self) -> Vec<String> {
        self.map(PathSegments::segments).unwrap_or_default()
    }
}
