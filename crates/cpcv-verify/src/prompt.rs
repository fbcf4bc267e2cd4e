//! Request construction for the CPCV cross-check.
//!
//! Layout of the user message:
//!
//! 1. [`CONTEXT_LINE`]
//! 2. The aggregated payload (four section markers, each followed by its
//!    category's fragments)
//! 3. [`TASK_INSTRUCTIONS`] with the report shape the answer must follow

use crate::models::ModelRequest;
use cpcv_core::ContentFragment;

/// Role and output rules for the model.
pub const SYSTEM_INSTRUCTION: &str = "You are a rigid legal auditor for Portuguese real-estate \
transactions. Be precise. Compare NIFs digit by digit. Report in Portuguese. You must output a \
JSON object following the required schema.";

/// First user part, framing what the sections below are.
pub const CONTEXT_LINE: &str = "DOCUMENTS_CONTEXT: Your task is to validate a 'Contrato Promessa \
de Compra e Venda' (CPCV) against source documents.";

/// Last user part: the checks to run and the exact answer shape.
pub const TASK_INSTRUCTIONS: &str = r#"INSTRUCTIONS:
1. Extract data from the source documents (owners, buyers, property).
2. Extract data from the CPCV.
3. Cross-reference the data. Verify:
   - Every owner listed in the CPCV is correct (names, NIFs, marital status).
   - Every buyer listed in the CPCV is correct.
   - The property description matches the property documents.
   - NIFs contain no typos.
   ***CRITICAL: When comparing identification numbers (NIF, CC, NIC, IBAN), IGNORE ALL SPACES. "123 456 789" is EQUAL to "123456789".***
4. CRITICAL: List in 'missingDocumentsData' any data found in the CPCV (ESPECIALLY IBANs, specific IDs, marriage certificates) that CANNOT be verified because the corresponding source document is missing.
5. Output the result strictly as JSON with this structure:
{
  "overallStatus": "VALID" | "INVALID" | "REVIEW_NEEDED",
  "summary": "string in Portuguese",
  "missingDocumentsData": ["string (e.g. 'IBAN PT50... no CPCV sem comprovativo', 'Certidão de Casamento em falta', 'Cartão de Cidadão caducado')"],
  "entities": {
    "owners": { "status": "MATCH" | "MISMATCH" | "MISSING", "notes": "string" },
    "buyers": { "status": "MATCH" | "MISMATCH" | "MISSING", "notes": "string" },
    "property": { "status": "MATCH" | "MISMATCH" | "MISSING", "notes": "string" }
  },
  "discrepancies": [
    { "severity": "CRITICAL" | "WARNING" | "INFO", "field": "string", "sourceDocValue": "string", "cpcvValue": "string", "description": "string in Portuguese" }
  ],
  "detailedComparison": {
    "owners": [
      // LIST ALL FIELDS FOUND (name, NIF, CC, marital status, address, ...), even if they MATCH.
      { "field": "Nome (Ex: João Silva)", "sourceValue": "string", "cpcvValue": "string", "status": "MATCH" | "MISMATCH" | "MISSING_SOURCE" | "MISSING_CPCV" },
      { "field": "NIF (Ex: 123456789)", "sourceValue": "string", "cpcvValue": "string", "status": "MATCH" | "MISMATCH" | "MISSING_SOURCE" | "MISSING_CPCV" }
    ],
    "buyers": [
      // LIST ALL FIELDS FOUND (name, NIF, CC, marital status, address, ...), even if they MATCH.
      { "field": "Nome", "sourceValue": "string", "cpcvValue": "string", "status": "MATCH" | "MISMATCH" | "MISSING_SOURCE" | "MISSING_CPCV" },
      { "field": "NIF", "sourceValue": "string", "cpcvValue": "string", "status": "MATCH" | "MISMATCH" | "MISSING_SOURCE" | "MISSING_CPCV" }
    ],
    "property": [
      // LIST ALL FIELDS FOUND (matrix article, fraction, address, description, areas, ...), even if they MATCH.
      { "field": "Artigo Matricial", "sourceValue": "string", "cpcvValue": "string", "status": "MATCH" | "MISMATCH" | "MISSING_SOURCE" | "MISSING_CPCV" },
      { "field": "Fração", "sourceValue": "string", "cpcvValue": "string", "status": "MATCH" | "MISMATCH" | "MISSING_SOURCE" | "MISSING_CPCV" }
    ]
  }
}"#;

/// Wrap an aggregated payload into the full model request.
#[must_use = "returns the model request"]
pub fn build_request(payload: Vec<ContentFragment>) -> ModelRequest {
    let mut parts = Vec::with_capacity(payload.len() + 2);
    parts.push(ContentFragment::marker(CONTEXT_LINE));
    parts.extend(payload);
    parts.push(ContentFragment::marker(TASK_INSTRUCTIONS));

    ModelRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        parts,
    }
}
