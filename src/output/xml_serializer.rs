use std::borrow::Cow;
use std::io;

use crate::entity::{serialize_attribute, serialize_cdata};
use crate::error::Error;
use crate::xmlvalue::DocType;

use super::Output;

/// Renders [`Output`] items as XML text.
pub(crate) struct XmlSerializer;

impl XmlSerializer {
    pub(crate) fn serialize<'a, W: io::Write>(
        w: &mut W,
        outputs: impl Iterator<Item = Result<Output<'a>, Error>>,
    ) -> Result<(), Error> {
        for output in outputs {
            let output = output?;
            w.write_all(Self::render_output(&output).as_bytes())?;
        }
        Ok(())
    }

    pub(crate) fn render_output<'b>(output: &'b Output<'_>) -> Cow<'b, str> {
        use Output::*;
        match output {
            Declaration { encoding } => match encoding {
                Some(encoding) => {
                    format!("<?xml version=\"1.0\" encoding=\"{}\"?>", encoding).into()
                }
                None => "<?xml version=\"1.0\"?>".into(),
            },
            DocType(doctype) => render_doctype(doctype).into(),
            StartTagOpen(element) => {
                let mut s = format!("<{}", element.name());
                for (name, value) in element.attributes() {
                    s.push_str(&format!(
                        " {}=\"{}\"",
                        name,
                        serialize_attribute(value.as_str().into())
                    ));
                }
                s.into()
            }
            StartTagClose => ">".into(),
            EmptyTagClose => "/>".into(),
            EndTag(element) => format!("</{}>", element.name()).into(),
            Comment(text) => format!("<!--{}-->", text).into(),
            ProcessingInstruction(target, data) => match data {
                Some(data) => format!("<?{} {}?>", target, data).into(),
                None => format!("<?{}?>", target).into(),
            },
            Text(text) => text.as_str().into(),
            Cdata(text) => serialize_cdata(text).into(),
            EntityRef(name) => format!("&{};", name).into(),
        }
    }
}

fn render_doctype(doctype: &DocType) -> String {
    let mut s = format!("<!DOCTYPE {}", doctype.element_name());
    match (doctype.public_id(), doctype.system_id()) {
        (Some(public_id), Some(system_id)) => {
            s.push_str(&format!(" PUBLIC \"{}\" \"{}\"", public_id, system_id))
        }
        (Some(public_id), None) => s.push_str(&format!(" PUBLIC \"{}\"", public_id)),
        (None, Some(system_id)) => s.push_str(&format!(" SYSTEM \"{}\"", system_id)),
        (None, None) => {}
    }
    if let Some(subset) = doctype.internal_subset() {
        s.push_str(&format!(" [{}]", subset));
    }
    s.push('>');
    s
}
