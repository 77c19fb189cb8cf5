use std::{fs, path::Path};

use log::info;

use super::{catalog::MunicipalityCatalog, CodegenError};

pub const DEFAULT_INPUT: &str = "src/qml/municipality_data.json";
pub const DEFAULT_OUTPUT: &str = "municipality_function.txt";

#[derive(Debug, PartialEq, Eq)]
pub struct ConversionSummary {
    pub provinces: usize,
    pub municipalities: usize,
}

/// Escape double quotes so the name can sit inside a `"..."` literal.
pub fn escape_quotes(name: &str) -> String {
    name.replace('"', "\\\"")
}

/// Generate the body of `loadMunicipalityNames(provinceCode)`, one branch per
/// province followed by a default branch for unknown codes.
///
/// An empty catalog yields the header and the default `else` branch only.
pub fn generate(catalog: &MunicipalityCatalog) -> Result<String, CodegenError> {
    let mut out = String::new();
    out.push_str("    // Function to load municipality names for a province\n");
    out.push_str("    function loadMunicipalityNames(provinceCode) {\n");

    for (i, (province, entry)) in catalog.provinces()?.into_iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "else if" };
        out.push_str(&format!("        {keyword} (provinceCode === {province}) {{\n"));
        out.push_str("            municipalityNames = {\n");
        for (code, name) in entry.municipalities()? {
            out.push_str(&format!(
                "                \"{code}\": \"{}\",\n",
                escape_quotes(name)
            ));
        }
        out.push_str("            };\n");
        out.push_str("        }\n");
    }

    out.push_str("        // Add a default case to handle other provinces\n");
    out.push_str("        else {\n");
    out.push_str("            // If we don't have data for this province, use an empty object\n");
    out.push_str("            municipalityNames = {};\n");
    out.push_str(
        "            console.log(\"No municipality data available for province code: \" + provinceCode);\n",
    );
    out.push_str("        }\n");
    out.push_str("    }\n");
    Ok(out)
}

/// Read the catalog at `input`, generate the lookup function and write it to
/// `output`, overwriting any previous content.  Nothing is written if any step
/// before the write fails.
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<ConversionSummary, CodegenError> {
    let catalog = MunicipalityCatalog::load(input)?;
    let text = generate(&catalog)?;
    let output = output.as_ref();
    fs::write(output, &text).map_err(|source| CodegenError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    info!("wrote {} bytes to {}", text.len(), output.display());
    Ok(ConversionSummary {
        provinces: catalog.len(),
        municipalities: catalog.municipality_count(),
    })
}
