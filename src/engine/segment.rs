use serde::Serialize;

/// Classification of an output run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
	/// Source text no rule touched.
	Original,
	/// Text matched by a highlight-only rule.
	Added,
	/// Output of a replacement rule.
	Replaced,
}

/// One classified run of output text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
	pub kind: SegmentKind,
	pub text: String,
}

impl Segment {
	pub fn new(kind: SegmentKind, text: impl Into<String>) -> Self {
		Segment {
			kind,
			text: text.into(),
		}
	}

	pub fn original(text: impl Into<String>) -> Self {
		Self::new(SegmentKind::Original, text)
	}
}
