//! Fixed prompt text for the model fallbacks.

/// Joins an instruction template and the document it applies to.
pub const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

pub const HTML_SYSTEM_PROMPT: &str =
    "You extract job descriptions from HTML. Output only the extracted text.";

pub const PAGE_SYSTEM_PROMPT: &str = "You extract job descriptions and requirements from web page content. Output only the extracted text.";

/// Phrase the HTML prompt asks the model to answer with when nothing is there.
pub const NOT_FOUND_SENTINEL: &str = "no job description found";

pub const EXTRACT_JOB_FROM_HTML_PROMPT: &str = r#"The following is the raw HTML of a job posting page. The visible body may be empty because the page is rendered by JavaScript, but the job is often still present in:
- <meta> tags (description, og:description, twitter:description)
- embedded JSON or JSON-LD (look for "@type": "JobPosting", "description", "qualifications", "responsibilities")
- inline script state (e.g. window.__INITIAL_STATE__, __NEXT_DATA__)
- <noscript> fallbacks

Extract the job posting as readable plain text: job title, company, location, the full description, responsibilities, requirements and qualifications, and benefits if present.

Rules:
- Decode HTML entities and escaped characters; drop markup and code.
- Do not summarize or invent details; keep the original wording.
- If there is no job description anywhere in the HTML, reply with exactly: No job description found"#;

pub const EXTRACT_JOB_FROM_PAGE_PROMPT: &str = r#"The following text was extracted from a job posting web page. Besides the job itself it usually contains navigation, cookie banners, related jobs, footers and other noise.

Return only the job posting: job title, company, location, the description, responsibilities, requirements and qualifications, and benefits if present.

Rules:
- Keep the original wording; do not summarize or invent details.
- Drop everything that is not part of this specific job posting.
- Output plain text only."#;
