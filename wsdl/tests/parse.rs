use std::io::Write;

use soapctl_wsdl::{
    error::Error,
    parse, parse_str,
    registry::ElementIndex,
    signature::{self, SignatureError},
    types::{ElementKind, PrefixSource, QName},
};

const WEATHER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
    xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
    xmlns:s="http://www.w3.org/2001/XMLSchema"
    xmlns:tns="http://example.org/weather"
    targetNamespace="http://example.org/weather">
  <wsdl:types>
    <s:schema targetNamespace="http://example.org/weather">
      <s:element name="GetReading">
        <s:complexType>
          <s:sequence>
            <s:element name="station" type="s:int"/>
            <s:element name="unit" type="s:string"/>
          </s:sequence>
        </s:complexType>
      </s:element>
      <s:element name="GetReadingResponse">
        <s:complexType>
          <s:sequence>
            <s:element name="GetReadingResult" type="s:double"/>
          </s:sequence>
        </s:complexType>
      </s:element>
      <s:element name="Echo">
        <s:complexType>
          <s:sequence>
            <s:element name="x" type="s:string"/>
          </s:sequence>
        </s:complexType>
      </s:element>
      <s:element name="EchoResponse">
        <s:complexType>
          <s:sequence>
            <s:element name="EchoResult" type="s:string"/>
          </s:sequence>
        </s:complexType>
      </s:element>
      <s:element name="Reset">
        <s:complexType>
          <s:sequence/>
        </s:complexType>
      </s:element>
    </s:schema>
  </wsdl:types>
  <wsdl:message name="GetReadingSoapIn">
    <wsdl:part name="parameters" element="tns:GetReading"/>
  </wsdl:message>
  <wsdl:message name="GetReadingSoapOut">
    <wsdl:part name="parameters" element="tns:GetReadingResponse"/>
  </wsdl:message>
  <wsdl:message name="EchoSoapIn">
    <wsdl:part name="parameters" element="tns:Echo"/>
  </wsdl:message>
  <wsdl:message name="EchoSoapOut">
    <wsdl:part name="parameters" element="tns:EchoResponse"/>
  </wsdl:message>
  <wsdl:message name="ResetSoapIn">
    <wsdl:part name="parameters" element="tns:Reset"/>
  </wsdl:message>
  <wsdl:portType name="WeatherSoap">
    <wsdl:operation name="GetReading">
      <wsdl:documentation>Current reading for one station.</wsdl:documentation>
      <wsdl:input message="tns:GetReadingSoapIn"/>
      <wsdl:output message="tns:GetReadingSoapOut"/>
    </wsdl:operation>
    <wsdl:operation name="Echo">
      <wsdl:input message="tns:EchoSoapIn"/>
      <wsdl:output message="tns:EchoSoapOut"/>
    </wsdl:operation>
    <wsdl:operation name="Reset">
      <wsdl:input message="tns:ResetSoapIn"/>
    </wsdl:operation>
  </wsdl:portType>
  <wsdl:binding name="WeatherSoapBinding" type="tns:WeatherSoap">
    <soap:binding transport="http://schemas.xmlsoap.org/soap/http" style="document"/>
    <wsdl:operation name="GetReading">
      <soap:operation soapAction="http://example.org/weather/GetReading" style="document"/>
      <wsdl:input><soap:body use="literal"/></wsdl:input>
      <wsdl:output><soap:body use="literal"/></wsdl:output>
    </wsdl:operation>
    <wsdl:operation name="Echo">
      <soap:operation soapAction="http://example.org/weather/Echo"/>
      <wsdl:input><soap:body use="literal"/></wsdl:input>
      <wsdl:output><soap:body use="literal"/></wsdl:output>
    </wsdl:operation>
    <wsdl:operation name="Reset">
      <soap:operation soapAction="http://example.org/weather/Reset"/>
      <wsdl:input><soap:body use="literal"/></wsdl:input>
    </wsdl:operation>
  </wsdl:binding>
  <wsdl:service name="Weather">
    <wsdl:port name="WeatherSoapPort" binding="tns:WeatherSoapBinding">
      <soap:address location="http://127.0.0.1:9999/weather"/>
    </wsdl:port>
  </wsdl:service>
</wsdl:definitions>"#;

/// Same service, but the root declares no namespace prefixes at all. The
/// parser falls back to the built-in default set.
const WEATHER_NO_PREFIXES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<wsdl:definitions targetNamespace="http://tempuri.org/">
  <wsdl:types>
    <s:schema targetNamespace="http://tempuri.org/">
      <s:element name="Echo">
        <s:complexType>
          <s:sequence>
            <s:element name="x" type="s:string"/>
          </s:sequence>
        </s:complexType>
      </s:element>
      <s:element name="EchoResponse">
        <s:complexType>
          <s:sequence>
            <s:element name="EchoResult" type="s:string"/>
          </s:sequence>
        </s:complexType>
      </s:element>
    </s:schema>
  </wsdl:types>
  <wsdl:message name="EchoSoapIn">
    <wsdl:part name="parameters" element="tns:Echo"/>
  </wsdl:message>
  <wsdl:message name="EchoSoapOut">
    <wsdl:part name="parameters" element="tns:EchoResponse"/>
  </wsdl:message>
  <wsdl:portType name="EchoSoap">
    <wsdl:operation name="Echo">
      <wsdl:input message="tns:EchoSoapIn"/>
      <wsdl:output message="tns:EchoSoapOut"/>
    </wsdl:operation>
  </wsdl:portType>
</wsdl:definitions>"#;

#[test]
fn lists_operations_in_declaration_order() {
    let document = parse_str(WEATHER).unwrap();
    let operations = document.operations();

    assert_eq!(operations, vec!["GetReading", "Echo", "Reset"]);
}

#[test]
fn declared_prefixes_are_tagged_as_declared() {
    let document = parse_str(WEATHER).unwrap();

    assert_eq!(document.prefix_source, PrefixSource::Declared);
    assert_eq!(document.target_namespace, "http://example.org/weather");
}

#[test]
fn resolves_two_parameter_signature() {
    let document = parse_str(WEATHER).unwrap();
    let signature = signature::resolve(&document, "GetReading").unwrap();

    assert_eq!(
        signature.to_string(),
        "GetReading(station: int, unit: string) -> double"
    );
}

#[test]
fn resolves_single_parameter_signature() {
    let document = parse_str(WEATHER).unwrap();
    let signature = signature::resolve(&document, "Echo").unwrap();

    assert_eq!(signature.to_string(), "Echo(x: string) -> string");
}

#[test]
fn operation_without_output_reports_none() {
    let document = parse_str(WEATHER).unwrap();
    let signature = signature::resolve(&document, "Reset").unwrap();

    assert_eq!(signature.to_string(), "Reset() -> none");
}

#[test]
fn unknown_operation_is_an_absence_not_a_panic() {
    let document = parse_str(WEATHER).unwrap();

    assert!(document.find_operation("doesNotExist").is_none());

    let result = signature::resolve(&document, "doesNotExist");
    assert!(matches!(result, Err(SignatureError::OperationNotFound(_))));
}

#[test]
fn resolves_endpoint_through_binding() {
    let document = parse_str(WEATHER).unwrap();
    let endpoint = document.resolve_endpoint("GetReading").unwrap();

    assert_eq!(endpoint.location, "http://127.0.0.1:9999/weather");
    assert_eq!(endpoint.style, "document");
    assert_eq!(
        endpoint.action.as_deref(),
        Some("http://example.org/weather/GetReading")
    );
}

#[test]
fn binding_style_is_the_default_when_the_operation_declares_none() {
    let document = parse_str(WEATHER).unwrap();
    let endpoint = document.resolve_endpoint("Echo").unwrap();

    assert_eq!(endpoint.style, "document");
}

#[test]
fn no_endpoint_without_a_service_section() {
    let document = parse_str(WEATHER_NO_PREFIXES).unwrap();

    assert!(document.resolve_endpoint("Echo").is_none());
}

#[test]
fn falls_back_to_default_prefixes_when_the_root_declares_none() {
    let document = parse_str(WEATHER_NO_PREFIXES).unwrap();

    assert_eq!(document.prefix_source, PrefixSource::FallbackDefaults);
    assert_eq!(document.operations(), vec!["Echo"]);

    let signature = signature::resolve(&document, "Echo").unwrap();
    assert_eq!(signature.to_string(), "Echo(x: string) -> string");
}

#[test]
fn indexes_schema_elements_by_qualified_name() {
    let document = parse_str(WEATHER).unwrap();
    let index = ElementIndex::new(&document);

    let element = index
        .resolve(&QName::new("http://example.org/weather", "GetReading"))
        .unwrap();

    match &element.kind {
        ElementKind::Complex(fields) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].name, "station");
            assert_eq!(fields[0].ty.local, "int");
        }

        other => panic!("expected a complex element, got {:?}", other),
    }

    assert!(index
        .resolve(&QName::new("http://example.org/weather", "NoSuchElement"))
        .is_none());
}

#[test]
fn element_lookup_falls_back_to_local_names() {
    let document = parse_str(WEATHER).unwrap();
    let index = ElementIndex::new(&document);

    let element = index.resolve(&QName::new("", "Echo")).unwrap();
    assert_eq!(element.name.local, "Echo");
}

#[test]
fn malformed_xml_is_a_parse_error() {
    let result = parse_str(
        r#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
            targetNamespace="urn:x"><wsdl:types></oops></wsdl:definitions>"#,
    );

    assert!(matches!(result, Err(Error::XmlParseError(_))));
}

#[test]
fn non_wsdl_documents_are_rejected() {
    let result = parse_str("<catalog><item/></catalog>");

    assert!(matches!(result, Err(Error::MissingSection("definitions"))));
}

#[test]
fn message_without_a_name_is_rejected() {
    let result = parse_str(
        r#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"
            targetNamespace="urn:x">
          <wsdl:message><wsdl:part name="parameters" element="tns:Thing"/></wsdl:message>
        </wsdl:definitions>"#,
    );

    assert!(matches!(
        result,
        Err(Error::MissingAttribute {
            element: "message",
            attribute: "name",
        })
    ));
}

#[test]
fn parses_from_a_filesystem_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", WEATHER).unwrap();

    let document = parse(file.path().to_str().unwrap()).unwrap();

    assert_eq!(document.operations(), vec!["GetReading", "Echo", "Reset"]);
}

#[test]
fn unsupported_schemes_are_rejected() {
    let result = parse("ftp://example.org/service.wsdl");

    assert!(matches!(result, Err(Error::UnsupportedScheme(_))));
}
