use chord_ring::NodeExport;

/// Render the ring as a graphviz digraph: one successor edge per member,
/// plus a label box with its stored keys and one with its finger table.
/// Turning the dot text into an image is left to graphviz.
pub fn render(exports: &[NodeExport]) -> String {
    let mut out = String::from("digraph G {\n");
    for export in exports {
        out.push_str(&format!("{} -> {}\n", export.id, export.successor));

        let mut keys = String::from("Keys:\\n-------------\\n");
        for entry in &export.keys {
            keys.push_str(&format!(
                "key: {} - data: '{}'\\n",
                entry.key,
                escape(&entry.value)
            ));
        }
        out.push_str(&format!(
            "data_{} [label=\"{}\", shape=box]\n",
            export.id, keys
        ));
        out.push_str(&format!("{} -> data_{}\n", export.id, export.id));

        let mut fingers = String::from("Finger Table:\\n-------------\\n");
        for entry in &export.fingers {
            fingers.push_str(&format!("{} : {}\\n", entry.start, entry.node));
        }
        out.push_str(&format!(
            "fingers_{} [label=\"{}\", shape=box]\n",
            export.id, fingers
        ));
        out.push_str(&format!("{} -> fingers_{}\n", export.id, export.id));
    }
    out.push_str("}\n");
    out
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
