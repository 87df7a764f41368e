use std::path::Path;

/// Ecosystem of a cloned repository, inferred from marker files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Node,
    Python,
    Java,
    Ruby,
    Go,
    Unknown,
}

/// Non-Node markers, in priority order.
const MARKERS: &[(ProjectKind, &str)] = &[
    (ProjectKind::Python, "requirements.txt"),
    (ProjectKind::Java, "pom.xml"),
    (ProjectKind::Ruby, "Gemfile"),
    (ProjectKind::Go, "go.mod"),
];

const NODE_MARKER: &str = "package.json";

impl ProjectKind {
    /// `package.json` wins over every other marker.
    pub fn detect(root: &Path) -> Self {
        if root.join(NODE_MARKER).is_file() {
            return ProjectKind::Node;
        }
        MARKERS
            .iter()
            .find(|(_, marker)| root.join(marker).is_file())
            .map(|(kind, _)| *kind)
            .unwrap_or(ProjectKind::Unknown)
    }

    pub fn marker(&self) -> Option<&'static str> {
        match self {
            ProjectKind::Node => Some(NODE_MARKER),
            ProjectKind::Unknown => None,
            kind => MARKERS.iter().find(|(k, _)| k == kind).map(|(_, m)| *m),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectKind::Node => "Node.js",
            ProjectKind::Python => "Python",
            ProjectKind::Java => "Java",
            ProjectKind::Ruby => "Ruby",
            ProjectKind::Go => "Go",
            ProjectKind::Unknown => "Unknown",
        }
    }

    /// Informational fragment for projects the pipeline has no tools for.
    pub fn detection_fragment(&self) -> String {
        match self.marker() {
            Some(marker) => format!(
                "✅ {} project detected ({marker} found)",
                self.display_name()
            ),
            None => "ℹ️ Project type not specifically identified".to_string(),
        }
    }
}
