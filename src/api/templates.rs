use crate::error::Result;
use minijinja::Environment;
use serde::Serialize;

/// Page templates, compiled once at startup. `.html` names are auto-escaped.
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// # Errors
    /// Returns `minijinja::Error` if a bundled template does not parse.
    pub fn new() -> std::result::Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("layout.html", include_str!("../../templates/layout.html"))?;
        env.add_template("base.html", include_str!("../../templates/base.html"))?;
        env.add_template("messages.html", include_str!("../../templates/messages.html"))?;
        env.add_template("add_edit.html", include_str!("../../templates/add_edit.html"))?;
        Ok(Self { env })
    }

    /// # Errors
    /// Returns `AppError::Template` if the template is unknown or fails to render.
    pub fn render(&self, name: &str, context: impl Serialize) -> Result<String> {
        Ok(self.env.get_template(name)?.render(context)?)
    }
}
