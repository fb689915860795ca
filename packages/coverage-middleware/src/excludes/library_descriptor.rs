//! Typed view of the coverage section of a `.library` descriptor:
//!
//! ```xml
//! <library xmlns="http://www.sap.com/sap.ui.library.xsd">
//!   <name>ui5.customlib</name>
//!   <appData>
//!     <jscoverage xmlns="http://www.sap.com/ui5/buildext/jscoverage">
//!       <exclude name="ui5.customlib.utils." />
//!       <exclude name="sap.m." external="true" />
//!     </jscoverage>
//!   </appData>
//! </library>
//! ```
//!
//! Elements are matched by local name, namespaces are not checked.
use roxmltree::{Document, Node};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LibraryDescriptor {
    pub name: String,
    pub excludes: Vec<ExcludeDeclaration>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExcludeDeclaration {
    pub name: String,
    /// Declared for a namespace the library does not own.
    pub external: bool,
}

fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

impl LibraryDescriptor {
    pub fn parse(text: &str) -> Result<LibraryDescriptor, roxmltree::Error> {
        let document = Document::parse(text)?;
        let library = document.root_element();

        if library.tag_name().name() != "library" {
            return Ok(Default::default());
        }

        let name = child_elements(library, "name")
            .next()
            .and_then(|node| node.text())
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        let excludes = child_elements(library, "appData")
            .flat_map(|app_data| child_elements(app_data, "jscoverage"))
            .flat_map(|jscoverage| child_elements(jscoverage, "exclude"))
            .filter_map(|exclude| {
                let name = exclude.attribute("name")?.trim();
                if name.is_empty() {
                    return None;
                }

                Some(ExcludeDeclaration {
                    name: name.to_string(),
                    external: exclude.attribute("external") == Some("true"),
                })
            })
            .collect();

        Ok(LibraryDescriptor { name, excludes })
    }

    /// Declarations this library enforces; external ones are documentation only.
    pub fn owned_excludes(&self) -> impl Iterator<Item = &ExcludeDeclaration> {
        self.excludes.iter().filter(|exclude| !exclude.external)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_name_and_excludes() {
        let descriptor = LibraryDescriptor::parse(
            r#"<?xml version="1.0" encoding="UTF-8" ?>
<library xmlns="http://www.sap.com/sap.ui.library.xsd" >
	<name>ui5.customlib</name>
	<appData>
		<jscoverage xmlns="http://www.sap.com/ui5/buildext/jscoverage" >
			<exclude name="/my-file" />
			<exclude name="ui5.customlib.utils." />
			<exclude name="sap.m." external="true"/>
			<exclude />
		</jscoverage>
	</appData>
</library>"#,
        )
        .unwrap();

        assert_eq!(
            descriptor,
            LibraryDescriptor {
                name: "ui5.customlib".to_string(),
                excludes: vec![
                    ExcludeDeclaration {
                        name: "/my-file".to_string(),
                        external: false,
                    },
                    ExcludeDeclaration {
                        name: "ui5.customlib.utils.".to_string(),
                        external: false,
                    },
                    ExcludeDeclaration {
                        name: "sap.m.".to_string(),
                        external: true,
                    },
                ],
            }
        );
        assert_eq!(descriptor.owned_excludes().count(), 2);
    }

    #[test]
    fn other_root_elements_yield_empty_descriptor() {
        let descriptor = LibraryDescriptor::parse("<component><name>x</name></component>").unwrap();
        assert_eq!(descriptor, LibraryDescriptor::default());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(LibraryDescriptor::parse("<library><name>x</library>").is_err());
    }
}
