//! Shared functionality which is used in unit-tests
//!
//! [`ClassBuilder`] assembles small, structurally valid class files through
//! the public model API, so unit tests can exercise the decoder, rewriters,
//! and encoder without binary fixtures checked into the repo.

use crate::classfile::{
    attributes::{Attribute, AttributeInfo, CodeAttribute, ExceptionTableEntry},
    constpool::{ConstantEntry, ConstantPool},
    member::{MemberFlags, MemberInfo},
    ClassFile, ClassFlags,
};

/// Builds a minimal valid class file for tests.
pub(crate) struct ClassBuilder {
    class: ClassFile,
}

impl ClassBuilder {
    /// Start a public class named `name` extending `java/lang/Object`,
    /// class file version 52.0.
    pub(crate) fn new(name: &str) -> Self {
        let mut pool = ConstantPool::new();
        let class_name = pool.find_or_add_utf8(name.as_bytes()).unwrap();
        let this_class = pool
            .push(ConstantEntry::Class {
                name_index: class_name,
            })
            .unwrap();
        let object_name = pool.find_or_add_utf8(b"java/lang/Object").unwrap();
        let super_class = pool
            .push(ConstantEntry::Class {
                name_index: object_name,
            })
            .unwrap();

        ClassBuilder {
            class: ClassFile {
                minor_version: 0,
                major_version: 52,
                constant_pool: pool,
                access_flags: ClassFlags::PUBLIC | ClassFlags::SUPER,
                this_class,
                super_class,
                interfaces: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                attributes: Vec::new(),
            },
        }
    }

    /// Add a public method with the given bytecode and no exception table.
    pub(crate) fn method(self, name: &str, descriptor: &str, code: &[u8]) -> Self {
        self.method_with_handlers(name, descriptor, code, Vec::new())
    }

    /// Add a public method with the given bytecode and exception table rows.
    pub(crate) fn method_with_handlers(
        mut self,
        name: &str,
        descriptor: &str,
        code: &[u8],
        exception_table: Vec<ExceptionTableEntry>,
    ) -> Self {
        let pool = &mut self.class.constant_pool;
        let name_index = pool.find_or_add_utf8(name.as_bytes()).unwrap();
        let descriptor_index = pool.find_or_add_utf8(descriptor.as_bytes()).unwrap();
        let code_name = pool.find_or_add_utf8(b"Code").unwrap();

        self.class.methods.push(MemberInfo {
            access_flags: MemberFlags::PUBLIC,
            name_index,
            descriptor_index,
            attributes: vec![Attribute::Code(CodeAttribute {
                name_index: code_name,
                max_stack: 4,
                max_locals: 4,
                code: code.to_vec(),
                exception_table,
                attributes: Vec::new(),
            })],
        });
        self
    }

    /// Add a public field with no attributes.
    pub(crate) fn field(mut self, name: &str, descriptor: &str) -> Self {
        let pool = &mut self.class.constant_pool;
        let name_index = pool.find_or_add_utf8(name.as_bytes()).unwrap();
        let descriptor_index = pool.find_or_add_utf8(descriptor.as_bytes()).unwrap();

        self.class.fields.push(MemberInfo {
            access_flags: MemberFlags::PUBLIC,
            name_index,
            descriptor_index,
            attributes: Vec::new(),
        });
        self
    }

    /// Add an opaque class-level attribute.
    pub(crate) fn raw_attribute(mut self, name: &str, info: &[u8]) -> Self {
        let name_index = self
            .class
            .constant_pool
            .find_or_add_utf8(name.as_bytes())
            .unwrap();
        self.class.attributes.push(Attribute::Raw(AttributeInfo {
            name_index,
            info: info.to_vec(),
        }));
        self
    }

    fn class_entry(&mut self, owner: &str) -> u16 {
        let pool = &mut self.class.constant_pool;
        let owner_name = pool.find_or_add_utf8(owner.as_bytes()).unwrap();
        pool.find_or_add(ConstantEntry::Class {
            name_index: owner_name,
        })
        .unwrap()
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let pool = &mut self.class.constant_pool;
        let name_index = pool.find_or_add_utf8(name.as_bytes()).unwrap();
        let descriptor_index = pool.find_or_add_utf8(descriptor.as_bytes()).unwrap();
        pool.find_or_add(ConstantEntry::NameAndType {
            name_index,
            descriptor_index,
        })
        .unwrap()
    }

    /// Add a `Methodref` to the pool, returning its index.
    pub(crate) fn method_ref(mut self, owner: &str, name: &str, descriptor: &str) -> (Self, u16) {
        let class_index = self.class_entry(owner);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let index = self
            .class
            .constant_pool
            .find_or_add(ConstantEntry::MethodRef {
                class_index,
                name_and_type_index,
            })
            .unwrap();
        (self, index)
    }

    /// Add an `InterfaceMethodref` to the pool, returning its index.
    pub(crate) fn interface_method_ref(
        mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> (Self, u16) {
        let class_index = self.class_entry(owner);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let index = self
            .class
            .constant_pool
            .find_or_add(ConstantEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            })
            .unwrap();
        (self, index)
    }

    /// Add a `Fieldref` to the pool, returning its index.
    pub(crate) fn field_ref(mut self, owner: &str, name: &str, descriptor: &str) -> (Self, u16) {
        let class_index = self.class_entry(owner);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let index = self
            .class
            .constant_pool
            .find_or_add(ConstantEntry::FieldRef {
                class_index,
                name_and_type_index,
            })
            .unwrap();
        (self, index)
    }

    /// Add an `InvokeDynamic` descriptor to the pool, returning its index.
    ///
    /// The bootstrap index is carried as-is; the `BootstrapMethods`
    /// attribute is opaque to the engine, so tests need not materialize one.
    pub(crate) fn invoke_dynamic_ref(
        mut self,
        bootstrap_index: u16,
        name: &str,
        descriptor: &str,
    ) -> (Self, u16) {
        let name_and_type_index = self.name_and_type(name, descriptor);
        let index = self
            .class
            .constant_pool
            .find_or_add(ConstantEntry::InvokeDynamic {
                bootstrap_method_attr_index: bootstrap_index,
                name_and_type_index,
            })
            .unwrap();
        (self, index)
    }

    /// Finish and return the model.
    pub(crate) fn build(self) -> ClassFile {
        self.class
    }

    /// Finish and serialize.
    pub(crate) fn build_bytes(self) -> Vec<u8> {
        self.class.to_bytes().unwrap()
    }
}
