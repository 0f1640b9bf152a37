use std::path::PathBuf;

pub const NAME_VAR: &str = "wildlifeName";
pub const TIMESTEP_VAR: &str = "timestep";

const KNOWN_VARS: &[&str] = &[NAME_VAR, TIMESTEP_VAR];

/// A map path template such as `output/{wildlifeName}-{timestep}.asc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapNameTemplate {
    template: String,
}

impl MapNameTemplate {
    /// Parse a template, rejecting unknown variables and unbalanced braces.
    pub fn parse(template: &str) -> Result<Self, String> {
        if template.trim().is_empty() {
            return Err("map name template is empty".to_string());
        }
        for var in variables(template)? {
            if !KNOWN_VARS.contains(&var) {
                return Err(format!(
                    "unknown variable {{{}}} in map name template '{}'. Known variables: {{{}}}, {{{}}}",
                    var, template, NAME_VAR, TIMESTEP_VAR
                ));
            }
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    pub fn contains(&self, var: &str) -> bool {
        self.template.contains(&format!("{{{}}}", var))
    }

    pub fn render(&self, wildlife_name: &str, timestep: u32) -> PathBuf {
        PathBuf::from(
            self.template
                .replace(&format!("{{{}}}", NAME_VAR), wildlife_name)
                .replace(&format!("{{{}}}", TIMESTEP_VAR), &timestep.to_string()),
        )
    }
}

fn variables(template: &str) -> Result<Vec<&str>, String> {
    let mut vars = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        if rest[..open].contains('}') {
            return Err(format!("unmatched '}}' in map name template '{}'", template));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| format!("unclosed '{{' in map name template '{}'", template))?;
        let var = &after[..close];
        if var.contains('{') {
            return Err(format!("nested '{{' in map name template '{}'", template));
        }
        vars.push(var);
        rest = &after[close + 1..];
    }
    if rest.contains('}') {
        return Err(format!("unmatched '}}' in map name template '{}'", template));
    }
    Ok(vars)
}
