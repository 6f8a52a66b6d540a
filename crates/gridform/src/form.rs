#![forbid(unsafe_code)]

//! The [`Form`] facade: configuration surface, grid rendering, callbacks.
//!
//! # Design
//!
//! A form owns one [`FormStore`], the memoised layout, and one [`Binding`]
//! per laid-out field. Bindings are built in the same order the packer
//! emits non-synthetic cells, so rendering walks rows and bindings in
//! lockstep.
//!
//! # Invariants
//!
//! 1. Rows are recomputed only when the schema or the override spec is
//!    replaced (by identity). Context and value changes never re-pack.
//! 2. A failed re-layout leaves the previous schema, spec, rows and
//!    bindings in place.
//! 3. Row overrides see only visible fields, never placeholders.
//!
//! # Usage
//!
//! ```ignore
//! let mut form = Form::builder()
//!     .schema(schema)
//!     .fields(OverrideSpec::list([...]))
//!     .on_submit(|values| println!("{values}"))
//!     .build()?;
//! form.set_value("firstName", json!("Ada"));
//! let tree = form.render()?;
//! ```

use std::fmt;
use std::rc::Rc;

use gridform_core::{
    Attr, ContextMap, Element, InternalField, JsonSchema, MergeReport, ObjectSchema,
    OverrideSpec, RenderNode, SchemaAdapter, SchemaError, WidgetType,
};
use gridform_layout::GridRow;
use gridform_runtime::{
    ArrayBinding, Binding, FormSnapshot, FormState, FormStore, SubmitOutcome, Subscription,
    Validator,
};
use gridform_widgets::{FieldView, Widget, WidgetRegistry, render_field};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::config::FormConfig;
use crate::error::Result;
use crate::pipeline::{Layout, Pipeline};

/// Called with the submitted values after validation passes.
pub type SubmitHandler = Rc<dyn Fn(&Value)>;

pub type CancelHandler = Rc<dyn Fn()>;

/// Called once on build with the initial snapshot, then on every change.
pub type StateHandler = Rc<dyn Fn(&FormSnapshot)>;

/// Wraps one rendered row: `(row node, row index, visible fields)`.
pub type RowOverride = Rc<dyn Fn(RenderNode, usize, &[&InternalField]) -> RenderNode>;

/// Builder for [`Form`].
#[must_use]
pub struct FormBuilder {
    schema: Option<Rc<dyn SchemaAdapter>>,
    initial_values: Option<Map<String, Value>>,
    fields: Option<Rc<OverrideSpec>>,
    context: Option<ContextMap>,
    on_submit: Option<SubmitHandler>,
    on_cancel: Option<CancelHandler>,
    on_state_change: Option<StateHandler>,
    widgets: WidgetRegistry,
    row_overrides: Option<RowOverride>,
    config: FormConfig,
    store: FormStore,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self {
            schema: None,
            initial_values: None,
            fields: None,
            context: None,
            on_submit: None,
            on_cancel: None,
            on_state_change: None,
            widgets: WidgetRegistry::with_builtins(),
            row_overrides: None,
            config: FormConfig::default(),
            store: FormStore::default(),
        }
    }
}

impl FormBuilder {
    pub fn schema(self, schema: impl SchemaAdapter + 'static) -> Self {
        self.shared_schema(Rc::new(schema))
    }

    /// Schema by shared handle. Passing the same handle to
    /// [`Form::set_shared_schema`] later keeps the cached layout.
    pub fn shared_schema(mut self, schema: Rc<dyn SchemaAdapter>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Parse a JSON Schema document and use it as the schema.
    pub fn json_schema(self, document: &str) -> std::result::Result<Self, SchemaError> {
        Ok(self.schema(JsonSchema::from_json_str(document)?))
    }

    /// Values to start from. Without this the schema's defaults are used.
    pub fn initial_values(mut self, values: Map<String, Value>) -> Self {
        self.initial_values = Some(values);
        self
    }

    pub fn fields(self, spec: OverrideSpec) -> Self {
        self.shared_fields(Rc::new(spec))
    }

    pub fn shared_fields(mut self, spec: Rc<OverrideSpec>) -> Self {
        self.fields = Some(spec);
        self
    }

    pub fn context(mut self, context: ContextMap) -> Self {
        self.context = Some(context);
        self
    }

    pub fn on_submit(mut self, f: impl Fn(&Value) + 'static) -> Self {
        self.on_submit = Some(Rc::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl Fn() + 'static) -> Self {
        self.on_cancel = Some(Rc::new(f));
        self
    }

    pub fn on_state_change(mut self, f: impl Fn(&FormSnapshot) + 'static) -> Self {
        self.on_state_change = Some(Rc::new(f));
        self
    }

    /// Replace the whole widget registry.
    pub fn widgets(mut self, widgets: WidgetRegistry) -> Self {
        self.widgets = widgets;
        self
    }

    /// Register one widget, replacing any built-in with the same tag.
    pub fn widget(
        mut self,
        tag: impl Into<WidgetType>,
        widget: impl Widget + 'static,
    ) -> Self {
        self.widgets.register(tag, widget);
        self
    }

    pub fn row_overrides(
        mut self,
        f: impl Fn(RenderNode, usize, &[&InternalField]) -> RenderNode + 'static,
    ) -> Self {
        self.row_overrides = Some(Rc::new(f));
        self
    }

    pub fn config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a submit-time validator.
    pub fn validator(self, validator: impl Validator + 'static) -> Self {
        self.store.add_validator(validator);
        self
    }

    /// Validate the configuration, lay the fields out, and bind them.
    pub fn build(self) -> Result<Form> {
        self.config.check()?;
        let schema = self
            .schema
            .unwrap_or_else(|| Rc::new(ObjectSchema::new()));

        let mut pipeline = Pipeline::new(self.config.grid, self.config.diagnostics.warn_detached);
        let (layout, _) = pipeline.run(&schema, self.fields.as_ref())?;

        let initial = self
            .initial_values
            .unwrap_or_else(|| schema.default_values());
        self.store.reset(initial);

        let state_subscription = self.on_state_change.map(|handler| {
            handler(&self.store.snapshot());
            self.store.subscribe_state(handler)
        });

        let shared: Rc<dyn FormState> = Rc::new(self.store.clone());
        let mut form = Form {
            schema,
            overrides: self.fields,
            context: self.context,
            store: self.store,
            shared,
            widgets: self.widgets,
            row_overrides: self.row_overrides,
            on_submit: self.on_submit,
            on_cancel: self.on_cancel,
            config: self.config,
            pipeline,
            layout,
            bindings: Vec::new(),
            index: FxHashMap::default(),
            _state_subscription: state_subscription,
        };
        form.rebind();
        tracing::debug!(
            rows = form.layout.rows.len(),
            fields = form.bindings.len(),
            "form built"
        );
        Ok(form)
    }
}

/// A built form.
pub struct Form {
    schema: Rc<dyn SchemaAdapter>,
    overrides: Option<Rc<OverrideSpec>>,
    context: Option<ContextMap>,
    store: FormStore,
    shared: Rc<dyn FormState>,
    widgets: WidgetRegistry,
    row_overrides: Option<RowOverride>,
    on_submit: Option<SubmitHandler>,
    on_cancel: Option<CancelHandler>,
    config: FormConfig,
    pipeline: Pipeline,
    layout: Rc<Layout>,
    bindings: Vec<Binding>,
    index: FxHashMap<String, usize>,
    _state_subscription: Option<Subscription>,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("rows", &self.layout.rows.len())
            .field("fields", &self.bindings.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Form {
    pub fn builder() -> FormBuilder {
        FormBuilder::default()
    }

    // --- Layout ------------------------------------------------------------

    #[must_use]
    pub fn rows(&self) -> &[GridRow] {
        &self.layout.rows
    }

    /// Detached names and unknown map keys from the last layout.
    #[must_use]
    pub fn report(&self) -> &MergeReport {
        &self.layout.report
    }

    /// Times the layout pipeline actually ran (cache misses).
    #[must_use]
    pub fn layout_runs(&self) -> u64 {
        self.pipeline.runs()
    }

    #[must_use]
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Replace the override spec. Passing `None` restores schema defaults.
    pub fn set_fields(&mut self, spec: Option<OverrideSpec>) -> Result<()> {
        self.set_shared_fields(spec.map(Rc::new))
    }

    pub fn set_shared_fields(&mut self, spec: Option<Rc<OverrideSpec>>) -> Result<()> {
        let schema = Rc::clone(&self.schema);
        self.relayout(schema, spec)
    }

    /// Replace the schema. Current values are kept.
    pub fn set_schema(&mut self, schema: impl SchemaAdapter + 'static) -> Result<()> {
        self.set_shared_schema(Rc::new(schema))
    }

    pub fn set_shared_schema(&mut self, schema: Rc<dyn SchemaAdapter>) -> Result<()> {
        let spec = self.overrides.clone();
        self.relayout(schema, spec)
    }

    fn relayout(
        &mut self,
        schema: Rc<dyn SchemaAdapter>,
        overrides: Option<Rc<OverrideSpec>>,
    ) -> Result<()> {
        let (layout, fresh) = self.pipeline.run(&schema, overrides.as_ref())?;
        self.schema = schema;
        self.overrides = overrides;
        if fresh {
            self.layout = layout;
            self.rebind();
        }
        Ok(())
    }

    fn rebind(&mut self) {
        let bindings: Vec<Binding> = self
            .layout
            .fields()
            .map(|field| {
                Binding::new(
                    Rc::clone(field),
                    Rc::clone(&self.shared),
                    self.context.as_ref(),
                )
            })
            .collect();
        let mut index = FxHashMap::default();
        for (i, field) in self.layout.fields().enumerate() {
            index.entry(field.name.clone()).or_insert(i);
        }
        self.bindings = bindings;
        self.index = index;
    }

    // --- Bindings, values, context -----------------------------------------

    /// Binding of the first laid-out field called `name`.
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.index.get(name).map(|&i| &self.bindings[i])
    }

    /// Array binding for `name`, if that field is in array mode.
    #[must_use]
    pub fn array(&self, name: &str) -> Option<&ArrayBinding> {
        self.binding(name).and_then(Binding::as_array)
    }

    #[must_use]
    pub fn store(&self) -> &FormStore {
        &self.store
    }

    #[must_use]
    pub fn value(&self, path: &str) -> Value {
        self.store.value(path)
    }

    #[must_use]
    pub fn values(&self) -> Value {
        self.store.values()
    }

    pub fn set_value(&self, path: &str, value: Value) {
        self.store.set_value(path, value);
    }

    #[must_use]
    pub fn context(&self) -> Option<&ContextMap> {
        self.context.as_ref()
    }

    /// Replace the external context. Only fields whose watched context keys
    /// changed re-resolve.
    pub fn set_context(&mut self, context: Option<ContextMap>) {
        self.context = context;
        for binding in &self.bindings {
            binding.set_context(self.context.as_ref());
        }
    }

    // --- Submission ----------------------------------------------------------

    /// Validate and submit. The submit callback runs only when validation
    /// passes.
    pub fn submit(&self) -> SubmitOutcome {
        let outcome = self.store.handle_submit();
        if let (SubmitOutcome::Submitted(values), Some(on_submit)) = (&outcome, &self.on_submit) {
            on_submit(values);
        }
        outcome
    }

    pub fn cancel(&self) {
        if let Some(on_cancel) = &self.on_cancel {
            on_cancel();
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        self.store.snapshot()
    }

    // --- Rendering -----------------------------------------------------------

    /// Render the whole form: the grid, then the submit actions when
    /// `show_submit` is set.
    pub fn render(&self) -> Result<RenderNode> {
        let _span = tracing::debug_span!("gridform.render", rows = self.layout.rows.len()).entered();
        let grid = self.grid(&self.layout.rows, &self.bindings, self.row_overrides.as_ref())?;
        let actions = if self.config.show_submit {
            self.actions()
        } else {
            RenderNode::Empty
        };
        Ok(Element::new("form").child(grid).child(actions).into())
    }

    fn grid(
        &self,
        rows: &[GridRow],
        bindings: &[Binding],
        row_overrides: Option<&RowOverride>,
    ) -> Result<RenderNode> {
        let mut next = bindings.iter();
        let mut out = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let mut cells = Vec::with_capacity(row.cells().len());
            for cell in row.cells() {
                let content = if cell.is_placeholder() {
                    RenderNode::Empty
                } else {
                    match next.next() {
                        Some(binding) => self.field(binding)?,
                        None => RenderNode::Empty,
                    }
                };
                cells.push(RenderNode::from(
                    Element::new("cell").attr("span", cell.span).child(content),
                ));
            }
            let node: RenderNode = Element::new("row").attr("index", index).children(cells).into();
            out.push(match row_overrides {
                Some(wrap) => wrap(node, index, &row.visible_fields()),
                None => node,
            });
        }
        Ok(Element::new("grid")
            .attr("columns", self.config.grid.columns)
            .children(out)
            .into())
    }

    fn field(&self, binding: &Binding) -> Result<RenderNode> {
        match binding {
            Binding::Value(b) => {
                let field = b.field();
                let value = b.value();
                let attributes = b.attributes();
                let errors = b.errors();
                Ok(render_field(
                    &FieldView::new(&field, &value, &attributes, &errors),
                    &self.widgets,
                ))
            }
            Binding::Array(a) => self.array_field(a),
        }
    }

    /// Header with an add action, then one item grid per element, or an
    /// empty-state node. Arrays without item fields render nothing.
    fn array_field(&self, array: &ArrayBinding) -> Result<RenderNode> {
        if array.templates().is_empty() {
            return Ok(RenderNode::Empty);
        }
        let field = array.field();
        let label = field
            .attrs
            .label
            .as_ref()
            .and_then(Attr::as_literal)
            .filter(|l| !l.is_empty())
            .map(|l| RenderNode::from(Element::new("label").child(RenderNode::text(l.as_str()))))
            .unwrap_or_default();
        let header = Element::new("array-header").child(label).child(
            Element::new("button")
                .attr("action", "add")
                .attr("for", field.name.as_str()),
        );

        let items = array.items();
        let body: RenderNode = if items.is_empty() {
            Element::new("array-empty")
                .child(RenderNode::text("No items"))
                .into()
        } else {
            let packer = self.pipeline.packer();
            let mut nodes = Vec::with_capacity(items.len());
            for item in &items {
                let rows = packer.pack_shared(item.fields.iter().map(Binding::field))?;
                nodes.push(RenderNode::from(
                    Element::new("array-item")
                        .attr("index", item.index)
                        .attr("key", item.key.to_string())
                        .child(
                            Element::new("button")
                                .attr("action", "remove")
                                .attr("index", item.index),
                        )
                        .child(self.grid(&rows, &item.fields, None)?),
                ));
            }
            Element::new("array-items").children(nodes).into()
        };

        Ok(Element::new("array")
            .attr("name", field.name.as_str())
            .child(header)
            .child(body)
            .into())
    }

    fn actions(&self) -> RenderNode {
        let snapshot = self.store.snapshot();
        let mut submit = Element::new("button")
            .attr("action", "submit")
            .child(RenderNode::text("Submit"));
        if !snapshot.can_submit || snapshot.is_submitting {
            submit = submit.attr("disabled", true);
        }
        Element::new("actions")
            .child(
                Element::new("button")
                    .attr("action", "cancel")
                    .child(RenderNode::text("Cancel")),
            )
            .child(submit)
            .into()
    }
}
