//! The reconstruction prompt sent with every document.
//!
//! The prompt is one fixed instruction block; the extracted document text is
//! appended verbatim after the `DOCUMENT TEXT:` heading. Keeping it in one
//! place lets tests inspect it without a model.

/// Instruction block preceding the document text.
///
/// Ends with the `DOCUMENT TEXT:` heading and a newline, so the text can be
/// appended directly.
pub const RECONSTRUCTION_PROMPT: &str = r#"
You are reconstructing a COMPLETE PDF DOCUMENT into a FULL, LONG-FORM, EXPLANATORY TEXT.

You are given:
1) THE ENTIRE TEXT extracted from the PDF
2) ALL TABLES present in the document (either as text or images)
3) ALL IMAGES, CHARTS, GRAPHS, FIGURES, AND DIAGRAMS from the PDF

YOUR ABSOLUTE OBJECTIVE:
Create a SINGLE FINAL TEXT FILE that COMPLETELY REPLACES THE PDF.
A reader must gain the SAME understanding as reading the original document in full.

══════════════════════════════════════
‼️ ZERO-COMPRESSION RULE (CRITICAL) ‼️
══════════════════════════════════════
- DO NOT summarize
- DO NOT shorten explanations
- DO NOT reduce multi-paragraph ideas into bullet points
- DO NOT remove examples, numbers, assumptions, or explanations
- DO NOT trade depth in one area for depth in another
- EVERY modality (text, tables, charts, images) must be explained IN FULL

If a section is long in the document, it must be long in your output.
If a section is detailed, your explanation must be detailed.

══════════════════════════════════════
TEXT ANALYSIS (MANDATORY — FULL DEPTH)
══════════════════════════════════════
- Read the FULL document text from beginning to end
- Reconstruct EVERY section, subsection, and logical block
- Preserve:
  - Definitions
  - Background context
  - Step-by-step processes
  - Arguments and justifications
  - Examples and case descriptions
- Expand dense or technical text into clear explanatory paragraphs
- Maintain the original document's flow and structure

══════════════════════════════════════
TABLE ANALYSIS (MANDATORY — FULL DEPTH)
══════════════════════════════════════
For EVERY table:
- Identify what the table represents and why it exists
- Explain each column and each row in words
- Describe relationships, comparisons, patterns, and anomalies
- Translate numeric data into meaningful interpretation
- If the table supports a claim, restate the claim and show how the table proves it
- NO table is allowed to be skipped or lightly summarized

══════════════════════════════════════
CHART / GRAPH ANALYSIS (MANDATORY — FULL DEPTH)
══════════════════════════════════════
For EVERY chart or graph:
- Identify:
  - Chart type
  - X-axis and Y-axis labels and units
  - Legends and categories
- Describe:
  - Trends (increase, decrease, cycles, stability)
  - Comparisons between groups
  - Peaks, lows, and outliers
- Explain WHAT the chart demonstrates and WHY it matters
- Connect the chart explicitly to the relevant text section

══════════════════════════════════════
IMAGE / DIAGRAM ANALYSIS (MANDATORY — FULL DEPTH)
══════════════════════════════════════
For EVERY meaningful image or diagram:
- Describe all visible components
- Explain relationships, flows, hierarchies, or structures
- If it illustrates a process or system, walk through it step by step
- If it reinforces text, clearly restate that connection
- If it introduces new information, fully integrate it into the explanation

══════════════════════════════════════
INTEGRATION RULES (STRICT)
══════════════════════════════════════
- NOTHING gets lost when merging text, tables, and visuals
- References like "see Figure 3" must be resolved explicitly
- Maintain continuity and logical progression
- The output must read like a rewritten, expanded version of the PDF

══════════════════════════════════════
FINAL OUTPUT FORMAT (MANDATORY)
══════════════════════════════════════
## 1. Complete Document Reconstruction
- Long-form section-by-section explanation of the entire document

## 2. Exhaustive Table-by-Table Explanation
- Dedicated detailed explanation for every table

## 3. Exhaustive Chart and Figure Explanation
- Dedicated detailed explanation for every chart, graph, image, and diagram

## 4. Unified Full Context Narrative
- A continuous, readable explanation of the entire document from start to finish

QUALITY REQUIREMENTS:
- MULTIPLE PARAGRAPHS per section
- No shallow summaries
- No single-line insights
- Assume the reader NEVER saw the PDF

DO NOT BEGIN WRITING UNTIL YOU HAVE ANALYZED ALL TEXT, TABLES, CHARTS, AND IMAGES COMPLETELY.

DOCUMENT TEXT:
"#;

/// Build the full prompt for `text_content`.
///
/// Empty text still produces the complete instruction block.
pub fn reconstruction_prompt(text_content: &str) -> String {
    format!("{}{}\n", RECONSTRUCTION_PROMPT, text_content)
}
