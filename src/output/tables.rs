use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::providers::ProjectRepoMap;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Lists found projects; the clone URL column only appears for GitLab.
pub fn project_table(names: &[String], repo_map: &ProjectRepoMap) -> Table {
    let mut table = create_table();

    if repo_map.is_empty() {
        table.set_header(create_cyan_header(&["#", "Project"]));
        for (index, name) in names.iter().enumerate() {
            table.add_row(vec![Cell::new(index + 1), Cell::new(name)]);
        }
    } else {
        table.set_header(create_cyan_header(&["#", "Project", "Clone URL"]));
        for (index, name) in names.iter().enumerate() {
            let url = repo_map.get(name).unwrap_or("-");
            table.add_row(vec![
                Cell::new(index + 1),
                Cell::new(name),
                Cell::new(url).fg(TableColor::DarkGrey),
            ]);
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gerrit_table_has_two_columns() {
        let names = vec!["jgit".to_string(), "egit".to_string()];
        let rendered = project_table(&names, &ProjectRepoMap::default()).to_string();
        assert!(rendered.contains("jgit"));
        assert!(rendered.contains("egit"));
        assert!(!rendered.contains("Clone URL"));
    }

    #[test]
    fn test_gitlab_table_shows_clone_urls() {
        let names = vec!["a".to_string()];
        let map: ProjectRepoMap = vec![("a".to_string(), "https://gitlab.com/a.git".to_string())]
            .into_iter()
            .collect();
        let rendered = project_table(&names, &map).to_string();
        assert!(rendered.contains("Clone URL"));
        assert!(rendered.contains("https://gitlab.com/a.git"));
    }
}
