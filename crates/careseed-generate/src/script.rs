/// One line group of a fixture script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Comment(String),
    Insert(String),
    Blank,
}

/// Ordered SQL fixture script: header comments, then one section per entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureScript {
    statements: Vec<Statement>,
}

impl FixtureScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comment line; the `-- ` prefix is added here.
    pub fn comment(&mut self, text: impl AsRef<str>) {
        self.statements
            .push(Statement::Comment(format!("-- {}", text.as_ref())));
    }

    pub fn insert(&mut self, sql: String) {
        self.statements.push(Statement::Insert(sql));
    }

    pub fn blank(&mut self) {
        self.statements.push(Statement::Blank);
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn insert_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|statement| matches!(statement, Statement::Insert(_)))
            .count()
    }

    /// Newline-joined text, ending with a newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for statement in &self.statements {
            match statement {
                Statement::Comment(line) | Statement::Insert(line) => out.push_str(line),
                Statement::Blank => {}
            }
            out.push('\n');
        }
        out
    }
}
