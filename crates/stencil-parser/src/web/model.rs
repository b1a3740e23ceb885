use crate::ast::{Ast, Element, Node, NodeId};
use crate::context::ParseContext;
use crate::helpers::{add_raw_attr, get_and_remove_attr, get_binding_attr};
use crate::module::Module;
use crate::process::add_if_condition;

/// Expands `<input v-model>` with a bound `type` into a condition chain.
///
/// ```text
/// <input v-model="data[type]" :type="type">
/// ```
///
/// becomes one branch per input kind the model directive handles
/// differently:
///
/// ```text
/// <input v-if="type==='checkbox'" type="checkbox" v-model="data[type]">
/// <input v-else-if="type==='radio'" type="radio" v-model="data[type]">
/// <input v-else :type="type" v-model="data[type]">
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelModule;

fn non_empty(value: &Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

impl Module for ModelModule {
    fn pre_transform_node(&self, cx: &mut ParseContext<'_>, ast: &mut Ast, id: NodeId) -> Option<NodeId> {
        let el = ast.element_mut(id)?;
        if el.tag != "input" || !non_empty(&el.attr("v-model")) {
            return None;
        }

        let mut type_binding = None;
        if non_empty(&el.attr(":type")) || non_empty(&el.attr("v-bind:type")) {
            type_binding = get_binding_attr(el, "type", true);
        }
        if !non_empty(&el.attr("type")) && type_binding.is_none() {
            if let Some(object) = el.attr("v-bind").filter(|v| !v.is_empty()) {
                type_binding = Some(format!("({object}).type"));
            }
        }
        let type_binding = type_binding.filter(|binding| !binding.is_empty())?;

        let if_condition = get_and_remove_attr(el, "v-if", true).filter(|c| !c.is_empty());
        let extra = if_condition
            .as_ref()
            .map(|condition| format!("&&({condition})"))
            .unwrap_or_default();
        let has_else = get_and_remove_attr(el, "v-else", true).is_some();
        let else_if = get_and_remove_attr(el, "v-else-if", true).filter(|c| !c.is_empty());

        let template = el.clone();
        let clone = || {
            let mut branch = Element::new(template.tag.clone(), template.attrs_list.clone(), template.parent);
            branch.span = template.span;
            branch
        };
        let span = template.span;

        let mut checkbox = clone();
        cx.process_for(&mut checkbox);
        add_raw_attr(&mut checkbox, "type", "checkbox", span);
        let checkbox = ast.push(Node::Element(checkbox));
        cx.process_element(ast, checkbox);

        let mut radio = clone();
        get_and_remove_attr(&mut radio, "v-for", true);
        add_raw_attr(&mut radio, "type", "radio", span);
        let radio = ast.push(Node::Element(radio));
        cx.process_element(ast, radio);

        let mut other = clone();
        get_and_remove_attr(&mut other, "v-for", true);
        add_raw_attr(&mut other, ":type", &type_binding, span);
        let other = ast.push(Node::Element(other));
        cx.process_element(ast, other);

        let branch = ast.element_mut(checkbox)?;
        branch.processed = true;
        let condition = format!("({type_binding})==='checkbox'{extra}");
        branch.if_exp = Some(condition.clone());
        add_if_condition(branch, Some(condition), checkbox);
        add_if_condition(branch, Some(format!("({type_binding})==='radio'{extra}")), radio);
        add_if_condition(branch, if_condition, other);

        if has_else {
            branch.is_else = true;
        } else if else_if.is_some() {
            branch.else_if = else_if;
        }
        log::trace!("expanded <input v-model> with dynamic type into three branches");
        Some(checkbox)
    }
}
